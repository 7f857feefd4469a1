pub mod datasource;
pub mod param;
pub mod place_holder;
pub mod scene;
pub mod template;
