mod backup;
mod common;
mod service;
