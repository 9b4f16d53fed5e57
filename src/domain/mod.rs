//! Widget data model and the merge rules applied at construction.

pub mod error;
pub mod interval;
pub mod markup;
pub mod value;
pub mod widget;
