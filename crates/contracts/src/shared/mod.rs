pub mod filter_form;
