pub mod igdb;
