// Domain layer - dashboard, widget and series models
pub mod chart;
pub mod component_store;
pub mod dashboard;
pub mod data_source;
pub mod layout;
pub mod series;
pub mod widget;
pub mod widget_form;
