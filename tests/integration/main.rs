mod common;

mod ai;
mod budget;
mod pdf;
