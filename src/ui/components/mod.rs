pub mod chat_panel;
pub mod feed_list;
pub mod input_bar;
pub mod login_form;
pub mod nav_bar;
