mod config_quota;
