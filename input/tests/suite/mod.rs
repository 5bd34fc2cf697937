mod config_file;
mod suggestion_pick;
