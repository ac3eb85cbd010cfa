//! Faculty (professor) entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "faculty")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    #[sea_orm(nullable)]
    pub position: Option<String>,

    #[sea_orm(nullable)]
    pub email: Option<String>,

    /// Owning university; every professor belongs to exactly one
    pub university_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::university::Entity",
        from = "Column::UniversityId",
        to = "super::university::Column::Id"
    )]
    University,

    #[sea_orm(has_many = "super::faculty_keyword::Entity")]
    FacultyKeyword,
}

impl Related<super::university::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::University.def()
    }
}

impl Related<super::faculty_keyword::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FacultyKeyword.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
