mod comments;
mod pages;
mod sites;
mod users;
