//! egui renderers. Each function draws one section from prepared data and
//! never touches the table itself.

pub mod charts;
pub mod maps;
pub mod overview;
pub mod panels;
