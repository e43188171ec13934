// Weather watch face - Phone-side weather sync and wearable-side digital face
pub mod application;
pub mod domain;
pub mod infrastructure;
