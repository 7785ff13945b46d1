pub mod status;
pub mod widget;
