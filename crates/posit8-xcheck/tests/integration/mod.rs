mod commands;
mod cross_check;
