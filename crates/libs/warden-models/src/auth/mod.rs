//! Permission and role rows, and the grants between them.
//!
//! Rows are read through `diesel::sql_query` because every table name is
//! configuration; [`row`] holds the by-name result shapes those queries map
//! onto.

pub mod catalog;
pub mod relation;
pub mod row;
