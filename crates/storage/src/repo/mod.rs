mod bans;
mod chapters;
mod comments;
mod profiles;
mod reactions;
