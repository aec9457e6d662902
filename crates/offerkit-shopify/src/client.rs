use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::ShopifyError;
use crate::retry::retry_with_backoff;
use crate::types::{
    GraphQlEnvelope, ProductUpdateData, UserError, VariantHit, VariantLookupData,
    VariantPriceUpdateData,
};

const VARIANT_BY_SKU_QUERY: &str = r"
query VariantBySku($query: String!) {
  productVariants(first: 1, query: $query) {
    edges {
      node {
        id
        price
        product {
          id
          tags
        }
      }
    }
  }
}";

const VARIANT_PRICE_MUTATION: &str = r"
mutation VariantPriceUpdate($productId: ID!, $variants: [ProductVariantsBulkInput!]!) {
  productVariantsBulkUpdate(productId: $productId, variants: $variants) {
    productVariants {
      id
      price
    }
    userErrors {
      field
      message
    }
  }
}";

const PRODUCT_TAGS_MUTATION: &str = r"
mutation ProductTagsUpdate($input: ProductInput!) {
  productUpdate(input: $input) {
    product {
      id
    }
    userErrors {
      field
      message
    }
  }
}";

/// Builds the Admin GraphQL endpoint URL for a shop domain and API version.
///
/// Accepts a bare domain (`my-shop.myshopify.com`) or one with an explicit
/// scheme; trailing slashes are tolerated.
///
/// # Errors
///
/// Returns [`ShopifyError::InvalidShopDomain`] if the domain does not form a
/// valid URL.
pub fn admin_endpoint(shop_domain: &str, api_version: &str) -> Result<String, ShopifyError> {
    let trimmed = shop_domain.trim().trim_end_matches('/');
    let base = if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    let url = reqwest::Url::parse(&format!("{base}/admin/api/{api_version}/graphql.json"))
        .map_err(|e| ShopifyError::InvalidShopDomain {
            domain: shop_domain.to_owned(),
            reason: e.to_string(),
        })?;
    if url.host_str().is_none() {
        return Err(ShopifyError::InvalidShopDomain {
            domain: shop_domain.to_owned(),
            reason: "no host".to_owned(),
        });
    }
    Ok(url.to_string())
}

/// HTTP client for the Shopify Admin GraphQL API.
///
/// Every operation is a POST of `{query, variables}` against one
/// `graphql.json` endpoint, authenticated with the `X-Shopify-Access-Token`
/// header. Rate limiting (429), not-found (404), and other non-2xx responses
/// surface as typed errors; mutation `userErrors` are returned to the caller
/// rather than raised, since the HTTP exchange itself succeeded.
///
/// Transient errors (429, network failures, 5xx) are automatically retried
/// with exponential backoff up to `max_retries` additional attempts.
#[derive(Clone)]
pub struct AdminClient {
    client: Client,
    endpoint: String,
    access_token: String,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl AdminClient {
    /// Creates an `AdminClient` with configured timeout, `User-Agent`, and retry policy.
    ///
    /// `endpoint` is the full `graphql.json` URL, usually built with
    /// [`admin_endpoint`]. `max_retries` is the number of additional attempts
    /// after the first failure for retriable errors; set to `0` to disable
    /// retries. `backoff_base_secs` controls the base delay for exponential
    /// backoff: the wait before the n-th retry is `backoff_base_secs * 2^(n-1)`
    /// seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        endpoint: &str,
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ShopifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_owned(),
            access_token: access_token.to_owned(),
            max_retries,
            backoff_base_secs,
        })
    }

    /// Creates an `AdminClient` from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::InvalidShopDomain`] if the configured shop
    /// domain is unusable, or [`ShopifyError::Http`] if the HTTP client
    /// cannot be constructed.
    pub fn from_app_config(config: &offerkit_core::AppConfig) -> Result<Self, ShopifyError> {
        let endpoint = admin_endpoint(&config.shop_domain, &config.shopify_api_version)?;
        Self::new(
            &endpoint,
            &config.shopify_access_token,
            config.shopify_timeout_secs,
            &config.shopify_user_agent,
            config.shopify_max_retries,
            config.shopify_retry_backoff_base_secs,
        )
    }

    /// Looks up the variant matching a SKU, newest variant first.
    ///
    /// Issues a `productVariants(first: 1, query: "sku:<sku>")` search and
    /// flattens the first edge. Returns `Ok(None)` when nothing in the
    /// catalog carries the SKU.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::RateLimited`] — HTTP 429 after all retries exhausted.
    /// - [`ShopifyError::NotFound`] — HTTP 404 (wrong shop domain or API version).
    /// - [`ShopifyError::UnexpectedStatus`] — any other non-2xx status (5xx retried, 4xx not).
    /// - [`ShopifyError::GraphQl`] — the API rejected the query document.
    /// - [`ShopifyError::Http`] — network or TLS failure after all retries exhausted.
    /// - [`ShopifyError::Deserialize`] — response body does not match the expected shape.
    pub async fn variant_by_sku(&self, sku: &str) -> Result<Option<VariantHit>, ShopifyError> {
        let variables = serde_json::json!({ "query": format!("sku:{sku}") });
        let data: VariantLookupData = self
            .execute("variant lookup", VARIANT_BY_SKU_QUERY, variables)
            .await?;

        Ok(data
            .product_variants
            .edges
            .into_iter()
            .next()
            .map(|edge| VariantHit {
                variant_id: edge.node.id,
                product_id: edge.node.product.id,
                price: edge.node.price,
                tags: edge.node.product.tags,
            }))
    }

    /// Sets one variant's price via `productVariantsBulkUpdate`.
    ///
    /// Returns the mutation's `userErrors`; an empty vec means the price
    /// landed. `price` is a decimal string, as the API requires.
    ///
    /// # Errors
    ///
    /// Same error surface as [`Self::variant_by_sku`].
    pub async fn update_variant_price(
        &self,
        product_id: &str,
        variant_id: &str,
        price: &str,
    ) -> Result<Vec<UserError>, ShopifyError> {
        let variables = serde_json::json!({
            "productId": product_id,
            "variants": [{ "id": variant_id, "price": price }],
        });
        let data: VariantPriceUpdateData = self
            .execute("variant price update", VARIANT_PRICE_MUTATION, variables)
            .await?;

        let payload = data
            .product_variants_bulk_update
            .ok_or(ShopifyError::EmptyData {
                context: "variant price update",
            })?;
        Ok(payload.user_errors)
    }

    /// Replaces a product's tag list via `productUpdate`.
    ///
    /// The API overwrites the whole array, so callers must send the full
    /// merged list. Returns the mutation's `userErrors`.
    ///
    /// # Errors
    ///
    /// Same error surface as [`Self::variant_by_sku`].
    pub async fn update_product_tags(
        &self,
        product_id: &str,
        tags: &[String],
    ) -> Result<Vec<UserError>, ShopifyError> {
        let variables = serde_json::json!({
            "input": { "id": product_id, "tags": tags },
        });
        let data: ProductUpdateData = self
            .execute("product tags update", PRODUCT_TAGS_MUTATION, variables)
            .await?;

        let payload = data.product_update.ok_or(ShopifyError::EmptyData {
            context: "product tags update",
        })?;
        Ok(payload.user_errors)
    }

    /// Posts one GraphQL document with automatic retry on transient errors
    /// and deserializes the `data` object into `T`.
    async fn execute<T: DeserializeOwned>(
        &self,
        context: &'static str,
        query: &'static str,
        variables: serde_json::Value,
    ) -> Result<T, ShopifyError> {
        let body = serde_json::json!({ "query": query, "variables": variables });

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let body = body.clone();
            async move {
                let response = self
                    .client
                    .post(&self.endpoint)
                    .header("X-Shopify-Access-Token", &self.access_token)
                    .json(&body)
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);

                    return Err(ShopifyError::RateLimited {
                        domain: extract_domain(&self.endpoint),
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ShopifyError::NotFound {
                        url: self.endpoint.clone(),
                    });
                }

                if !status.is_success() {
                    return Err(ShopifyError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: self.endpoint.clone(),
                    });
                }

                let text = response.text().await?;
                let envelope = serde_json::from_str::<GraphQlEnvelope<T>>(&text).map_err(|e| {
                    ShopifyError::Deserialize {
                        context,
                        source: e,
                    }
                })?;

                if !envelope.errors.is_empty() {
                    let messages = envelope
                        .errors
                        .iter()
                        .map(|e| e.message.as_str())
                        .collect::<Vec<_>>()
                        .join("; ");
                    return Err(ShopifyError::GraphQl { context, messages });
                }

                envelope.data.ok_or(ShopifyError::EmptyData { context })
            }
        })
        .await
    }
}

/// Extracts the hostname from an endpoint URL for use in error messages.
///
/// Falls back to the full URL string if parsing fails.
fn extract_domain(endpoint: &str) -> String {
    let without_scheme = endpoint
        .strip_prefix("https://")
        .or_else(|| endpoint.strip_prefix("http://"))
        .unwrap_or(endpoint);
    without_scheme
        .split('/')
        .next()
        .unwrap_or(endpoint)
        .to_owned()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
