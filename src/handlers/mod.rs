pub mod index;
pub mod status;
pub mod widget;
