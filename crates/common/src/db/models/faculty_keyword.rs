//! Faculty-keyword association with an interest score

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "faculty_keyword")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub faculty_id: i32,

    #[sea_orm(primary_key, auto_increment = false)]
    pub keyword_id: i32,

    pub score: f32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::faculty::Entity",
        from = "Column::FacultyId",
        to = "super::faculty::Column::Id"
    )]
    Faculty,

    #[sea_orm(
        belongs_to = "super::keyword::Entity",
        from = "Column::KeywordId",
        to = "super::keyword::Column::Id"
    )]
    Keyword,
}

impl Related<super::faculty::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Faculty.def()
    }
}

impl Related<super::keyword::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Keyword.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
