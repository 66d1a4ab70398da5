pub mod local_file_store;
