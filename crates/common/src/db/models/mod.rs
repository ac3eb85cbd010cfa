//! SeaORM entity models
//!
//! Read-side entities for the `academicworld` relational schema

pub mod faculty;
pub mod faculty_keyword;
pub mod keyword;
pub mod publication;
pub mod publication_keyword;
pub mod university;

pub use university::{
    Entity as UniversityEntity,
    Model as University,
    Column as UniversityColumn,
};

pub use faculty::{
    Entity as FacultyEntity,
    Model as Faculty,
    Column as FacultyColumn,
};

pub use keyword::{
    Entity as KeywordEntity,
    Model as KeywordRow,
    Column as KeywordColumn,
};

pub use faculty_keyword::{
    Entity as FacultyKeywordEntity,
    Model as FacultyKeyword,
    Column as FacultyKeywordColumn,
};

pub use publication::{
    Entity as PublicationEntity,
    Model as Publication,
    Column as PublicationColumn,
};

pub use publication_keyword::{
    Entity as PublicationKeywordEntity,
    Model as PublicationKeyword,
    Column as PublicationKeywordColumn,
};
