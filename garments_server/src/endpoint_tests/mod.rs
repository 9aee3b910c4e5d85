mod accounts;
mod auth;
mod helpers;
mod products;
