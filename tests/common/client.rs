//! Thin reqwest wrapper over the HTTP surface under test.

use reqwest::multipart::{Form, Part};
use serde_json::json;

/// One upload slot: item type, member name, and an optional (file name,
/// bytes) pair. `None` models a form slot with no file chosen.
pub type UploadSlot<'a> = (&'a str, &'a str, Option<(&'a str, &'a [u8])>);

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub async fn home(&self) -> reqwest::Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("home request failed")
    }

    pub async fn get_discography(&self) -> reqwest::Response {
        self.client
            .get(format!("{}/api/shinee/discography", self.base_url))
            .send()
            .await
            .expect("discography request failed")
    }

    pub async fn get_stats(&self) -> reqwest::Response {
        self.client
            .get(format!("{}/api/stats", self.base_url))
            .send()
            .await
            .expect("stats request failed")
    }

    pub async fn get_wishlist(&self) -> reqwest::Response {
        self.client
            .get(format!("{}/api/editions/wishlist", self.base_url))
            .send()
            .await
            .expect("wishlist request failed")
    }

    pub async fn set_purchased(&self, edition_id: &str, is_purchased: bool) -> reqwest::Response {
        self.client
            .patch(format!(
                "{}/api/editions/{}/purchase",
                self.base_url, edition_id
            ))
            .json(&json!({ "isPurchased": is_purchased }))
            .send()
            .await
            .expect("purchase request failed")
    }

    pub async fn set_wishlist(&self, edition_id: &str, is_wishlist: bool) -> reqwest::Response {
        self.client
            .patch(format!(
                "{}/api/editions/{}/wishlist",
                self.base_url, edition_id
            ))
            .json(&json!({ "isWishlist": is_wishlist }))
            .send()
            .await
            .expect("wishlist request failed")
    }

    pub async fn get_discs(&self) -> reqwest::Response {
        self.client
            .get(format!("{}/api/master/discs", self.base_url))
            .send()
            .await
            .expect("discs request failed")
    }

    pub async fn get_editions(&self, disc_id: &str) -> reqwest::Response {
        self.client
            .get(format!(
                "{}/api/master/editions?discId={}",
                self.base_url, disc_id
            ))
            .send()
            .await
            .expect("editions request failed")
    }

    /// GET /api/random/items with the query string passed verbatim (e.g.
    /// "editionId=D001-01", "editionId=undefined", or "" for no filter).
    pub async fn get_items(&self, query: &str) -> reqwest::Response {
        let url = if query.is_empty() {
            format!("{}/api/random/items", self.base_url)
        } else {
            format!("{}/api/random/items?{}", self.base_url, query)
        };
        self.client
            .get(url)
            .send()
            .await
            .expect("items request failed")
    }

    /// POST /api/random/upload with positionally aligned multipart arrays.
    pub async fn upload_items(
        &self,
        disc_id: &str,
        edition_id: &str,
        slots: Vec<UploadSlot<'_>>,
    ) -> reqwest::Response {
        let mut form = Form::new()
            .text("discId", disc_id.to_string())
            .text("editionId", edition_id.to_string());

        for (item_type, member_name, file) in slots {
            form = form
                .text("names", item_type.to_string())
                .text("memberNames", member_name.to_string());
            form = match file {
                Some((file_name, bytes)) => form.part(
                    "images",
                    Part::bytes(bytes.to_vec())
                        .file_name(file_name.to_string())
                        .mime_str("image/jpeg")
                        .expect("invalid mime"),
                ),
                // An empty part, the way a browser submits a file input
                // with no file chosen.
                None => form.part("images", Part::bytes(Vec::new()).file_name("")),
            };
        }

        self.client
            .post(format!("{}/api/random/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .expect("upload request failed")
    }

    /// Raw multipart POST for malformed-batch tests.
    pub async fn upload_raw(&self, form: Form) -> reqwest::Response {
        self.client
            .post(format!("{}/api/random/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .expect("upload request failed")
    }
}
