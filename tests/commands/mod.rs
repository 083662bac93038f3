mod mock;
mod test_views;
