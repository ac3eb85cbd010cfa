//! Keyword vocabulary entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "keyword")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Stored lower-cased; the join key for every ranking query
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::faculty_keyword::Entity")]
    FacultyKeyword,

    #[sea_orm(has_many = "super::publication_keyword::Entity")]
    PublicationKeyword,
}

impl Related<super::faculty_keyword::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FacultyKeyword.def()
    }
}

impl Related<super::publication_keyword::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PublicationKeyword.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
