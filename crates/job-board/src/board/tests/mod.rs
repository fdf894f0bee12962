mod bookmarks;
mod common;
mod routing;
mod search;
