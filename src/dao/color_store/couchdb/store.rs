use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::{
    color::HexColor,
    dao::{color_store::ColorStore, storage::StorageResult},
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
};

const DOC_PREFIX: &str = "color:";

/// One document per image reference.
#[derive(Debug, Serialize, Deserialize)]
struct ColorDocument {
    #[serde(rename = "_id")]
    id: String,
    image_ref: String,
    color: HexColor,
}

fn doc_id(image_ref: &str) -> String {
    format!("{DOC_PREFIX}{image_ref}")
}

#[derive(Clone)]
pub struct CouchColorStore {
    client: Client,
    base_url: Arc<Url>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchColorStore {
    /// Connect to CouchDB and ensure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|_| {
            CouchDaoError::InvalidUrl {
                url: config.base_url.clone(),
            }
        })?;
        let auth = config
            .username
            .zip(config.password)
            .map(|(u, p)| (Arc::<str>::from(u), Arc::<str>::from(p)));

        let store = Self {
            client,
            base_url: Arc::new(base_url),
            database: Arc::<str>::from(config.database),
            auth,
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn url(&self, doc: Option<&str>) -> CouchResult<Url> {
        let mut url = (*self.base_url).clone();
        {
            let mut segments =
                url.path_segments_mut()
                    .map_err(|_| CouchDaoError::InvalidUrl {
                        url: self.base_url.to_string(),
                    })?;
            segments.pop_if_empty().push(&self.database);
            if let Some(doc) = doc {
                segments.push(doc);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        if let Some((ref user, ref pass)) = self.auth {
            builder.basic_auth(user.as_ref(), Some(pass.as_ref()))
        } else {
            builder
        }
    }

    async fn send(&self, method: Method, url: Url) -> CouchResult<reqwest::Response> {
        let path = url.path().to_owned();
        self.request(method, url)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend { path, source })
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let url = self.url(None)?;
        let path = url.path().to_owned();
        let response = self.send(Method::GET, url.clone()).await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self.send(Method::PUT, url).await?;
                // 412: another client created it in between.
                if create.status().is_success() || create.status() == StatusCode::PRECONDITION_FAILED
                {
                    Ok(())
                } else {
                    Err(CouchDaoError::RequestStatus {
                        path,
                        status: create.status(),
                    })
                }
            }
            other => Err(CouchDaoError::RequestStatus {
                path,
                status: other,
            }),
        }
    }

    async fn get_color(&self, image_ref: &str) -> CouchResult<Option<HexColor>> {
        let url = self.url(Some(&doc_id(image_ref)))?;
        let path = url.path().to_owned();
        let response = self.send(Method::GET, url).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<ColorDocument>()
                .await
                .map(|doc| Some(doc.color))
                .map_err(|source| CouchDaoError::DecodeResponse { path, source }),
            other => Err(CouchDaoError::RequestStatus {
                path,
                status: other,
            }),
        }
    }

    async fn put_color(&self, image_ref: &str, color: HexColor) -> CouchResult<()> {
        let id = doc_id(image_ref);
        let url = self.url(Some(&id))?;
        let path = url.path().to_owned();
        let document = ColorDocument {
            id,
            image_ref: image_ref.to_owned(),
            color,
        };

        let response = self
            .request(Method::PUT, url)
            .json(&document)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: path.clone(),
                source,
            })?;

        match response.status() {
            // Conflict means the key already resolved; entries are never overwritten.
            StatusCode::CONFLICT => Ok(()),
            status if status.is_success() => Ok(()),
            other => Err(CouchDaoError::RequestStatus {
                path,
                status: other,
            }),
        }
    }
}

impl ColorStore for CouchColorStore {
    fn load(&self, image_ref: &str) -> BoxFuture<'static, StorageResult<Option<HexColor>>> {
        let store = self.clone();
        let image_ref = image_ref.to_owned();
        Box::pin(async move { Ok(store.get_color(&image_ref).await?) })
    }

    fn save(&self, image_ref: &str, color: HexColor) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        let image_ref = image_ref.to_owned();
        Box::pin(async move { Ok(store.put_color(&image_ref, color).await?) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.ensure_database().await?) })
    }
}
