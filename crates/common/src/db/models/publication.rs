//! Publication entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "publication")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "ID")]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(nullable)]
    pub venue: Option<String>,

    #[sea_orm(nullable)]
    pub year: Option<i32>,

    #[sea_orm(nullable)]
    pub num_citations: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::publication_keyword::Entity")]
    PublicationKeyword,
}

impl Related<super::publication_keyword::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PublicationKeyword.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
