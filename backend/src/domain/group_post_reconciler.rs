//! Group post reconciliation.
//!
//! Keeps exactly one external post per restaurant and date listing the
//! current offers. Each run deletes the previously published post, then
//! publishes a fresh one when offers exist. The steps run strictly in order
//! and stop at the first failure:
//!
//! 1. resolve the principal's page token for the restaurant page;
//! 2. delete the old external post and record that it is gone;
//! 3. turn the date into absolute bounds in the region's timezone;
//! 4. load overlapping offers, stopping when there are none;
//! 5. compose and publish the message;
//! 6. record the new external post id.
//!
//! A failure in step 6 leaves a live post that is not recorded locally. It is
//! logged with the orphaned post id and reported; no compensating delete is
//! attempted.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::domain::ports::{
    Authenticator, GroupPostRepository, GroupPostRepositoryError, GroupPostSync,
    OfferRepository, PublishingClientError, RegionRepository,
};
use crate::domain::service_support::{
    day_bounds, load_region, map_group_post_error, map_offer_error,
};
use crate::domain::{
    CurrencySymbol, Error, OfferDate, OfferGroupPost, Restaurant, User,
    compose_group_post_message,
};

/// Service implementing [`GroupPostSync`].
#[derive(Clone)]
pub struct GroupPostReconciler<A: ?Sized, Rg: ?Sized, O: ?Sized, G: ?Sized> {
    authenticator: Arc<A>,
    regions: Arc<Rg>,
    offers: Arc<O>,
    posts: Arc<G>,
    currency: CurrencySymbol,
}

impl<A: ?Sized, Rg: ?Sized, O: ?Sized, G: ?Sized> GroupPostReconciler<A, Rg, O, G> {
    /// Create the reconciler from its collaborators and the currency symbol
    /// appended to prices.
    pub fn new(
        authenticator: Arc<A>,
        regions: Arc<Rg>,
        offers: Arc<O>,
        posts: Arc<G>,
        currency: CurrencySymbol,
    ) -> Self {
        Self {
            authenticator,
            regions,
            offers,
            posts,
            currency,
        }
    }
}

fn map_publishing_error(action: &str, error: PublishingClientError) -> Error {
    Error::bad_gateway(format!("failed to {action} group post: {error}"))
}

/// Fetch the post of `restaurant` for `date`, creating an unpublished one
/// from the restaurant's default template when none exists.
///
/// Losing an insert race to a concurrent request is resolved by reading the
/// winner's record.
pub(crate) async fn fetch_or_create_group_post<G>(
    posts: &G,
    restaurant: &Restaurant,
    date: &OfferDate,
) -> Result<OfferGroupPost, Error>
where
    G: GroupPostRepository + ?Sized,
{
    if let Some(post) = posts
        .find_by_date_and_restaurant(&restaurant.id, date)
        .await
        .map_err(map_group_post_error)?
    {
        return Ok(post);
    }

    let post = OfferGroupPost::new(
        restaurant.id,
        *date,
        restaurant.default_group_post_message_template.clone(),
    );
    match posts.insert(&post).await {
        Ok(()) => {
            debug!(restaurant_id = %restaurant.id, %date, "created group post");
            Ok(post)
        }
        Err(GroupPostRepositoryError::Duplicate { .. }) => posts
            .find_by_date_and_restaurant(&restaurant.id, date)
            .await
            .map_err(map_group_post_error)?
            .ok_or_else(|| {
                Error::internal(format!(
                    "group post for restaurant {} on {date} vanished after a duplicate insert",
                    restaurant.id
                ))
            }),
        Err(err) => Err(map_group_post_error(err)),
    }
}

#[async_trait]
impl<A, Rg, O, G> GroupPostSync for GroupPostReconciler<A, Rg, O, G>
where
    A: Authenticator + ?Sized,
    Rg: RegionRepository + ?Sized,
    O: OfferRepository + ?Sized,
    G: GroupPostRepository + ?Sized,
{
    async fn update(
        &self,
        mut post: OfferGroupPost,
        user: &User,
        restaurant: &Restaurant,
    ) -> Result<OfferGroupPost, Error> {
        if post.restaurant_id != restaurant.id {
            return Err(Error::internal(format!(
                "group post {} does not belong to restaurant {}",
                post.id, restaurant.id
            )));
        }
        let Some(page_id) = restaurant.page_id.as_ref() else {
            debug!(restaurant_id = %restaurant.id, "restaurant has no page; nothing to publish");
            return Ok(post);
        };
        let page_token = user.page_token(page_id).ok_or_else(|| {
            Error::forbidden(format!(
                "no access token for page {page_id}; log in again to publish"
            ))
        })?;
        let client = self.authenticator.api_connection(page_token);

        if let Some(previous) = post.facebook_post_id.clone() {
            client
                .delete_post(&previous)
                .await
                .map_err(|err| map_publishing_error("delete", err))?;
            post.facebook_post_id = None;
            self.posts
                .update(&post)
                .await
                .map_err(map_group_post_error)?;
            info!(
                restaurant_id = %restaurant.id,
                date = %post.date,
                post_id = %previous,
                "deleted previous group post"
            );
        }

        let region = load_region(self.regions.as_ref(), &restaurant.region_id).await?;
        let bounds = day_bounds(&region, &post.date)?;
        let offers = self
            .offers
            .find_for_restaurant(&restaurant.id, &bounds)
            .await
            .map_err(map_offer_error)?;
        if offers.is_empty() {
            debug!(restaurant_id = %restaurant.id, date = %post.date, "no offers; nothing to publish");
            return Ok(post);
        }

        let message = compose_group_post_message(&post.message_template, &offers, &self.currency);
        let post_id = client
            .publish(page_id, &message)
            .await
            .map_err(|err| map_publishing_error("publish", err))?;
        post.facebook_post_id = Some(post_id.clone());

        if let Err(err) = self.posts.update(&post).await {
            error!(
                restaurant_id = %restaurant.id,
                date = %post.date,
                orphaned_post_id = %post_id,
                error = %err,
                "published group post could not be recorded"
            );
            return Err(Error::internal(format!(
                "published post {post_id} could not be recorded: {err}"
            )));
        }
        info!(
            restaurant_id = %restaurant.id,
            date = %post.date,
            post_id = %post_id,
            offers = offers.len(),
            "published group post"
        );
        Ok(post)
    }

    async fn update_for_date(
        &self,
        date: &OfferDate,
        user: &User,
        restaurant: &Restaurant,
    ) -> Result<OfferGroupPost, Error> {
        let post = fetch_or_create_group_post(self.posts.as_ref(), restaurant, date).await?;
        self.update(post, user, restaurant).await
    }
}

#[cfg(test)]
#[path = "group_post_reconciler_tests.rs"]
mod tests;
