//! Group post service implementing [`GroupPostsCommand`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::group_post_reconciler::fetch_or_create_group_post;
use crate::domain::ports::{
    GroupPostRepository, GroupPostSync, GroupPostsCommand, RestaurantRepository,
};
use crate::domain::service_support::{load_managed_restaurant, map_group_post_error};
use crate::domain::{Error, OfferDate, OfferGroupPost, RestaurantId, User};

/// Service exposing group post records to restaurant staff.
#[derive(Clone)]
pub struct GroupPostService<R: ?Sized, G: ?Sized> {
    restaurants: Arc<R>,
    posts: Arc<G>,
    sync: Arc<dyn GroupPostSync>,
}

impl<R: ?Sized, G: ?Sized> GroupPostService<R, G> {
    /// Create the service.
    pub fn new(restaurants: Arc<R>, posts: Arc<G>, sync: Arc<dyn GroupPostSync>) -> Self {
        Self {
            restaurants,
            posts,
            sync,
        }
    }
}

#[async_trait]
impl<R, G> GroupPostsCommand for GroupPostService<R, G>
where
    R: RestaurantRepository + ?Sized,
    G: GroupPostRepository + ?Sized,
{
    async fn group_post(
        &self,
        user: &User,
        restaurant_id: &RestaurantId,
        date: &OfferDate,
    ) -> Result<OfferGroupPost, Error> {
        let restaurant =
            load_managed_restaurant(self.restaurants.as_ref(), user, restaurant_id).await?;
        fetch_or_create_group_post(self.posts.as_ref(), &restaurant, date).await
    }

    async fn update_message_template(
        &self,
        user: &User,
        restaurant_id: &RestaurantId,
        date: &OfferDate,
        message_template: String,
    ) -> Result<OfferGroupPost, Error> {
        if message_template.trim().is_empty() {
            return Err(Error::invalid_request("message template must not be empty"));
        }
        let restaurant =
            load_managed_restaurant(self.restaurants.as_ref(), user, restaurant_id).await?;
        let mut post = fetch_or_create_group_post(self.posts.as_ref(), &restaurant, date).await?;
        post.message_template = message_template;
        self.posts
            .update(&post)
            .await
            .map_err(map_group_post_error)?;
        self.sync.update(post, user, &restaurant).await
    }
}
