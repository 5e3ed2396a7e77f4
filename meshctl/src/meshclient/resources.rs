//! CRUD accessor for one mesh object kind

use super::error::{MeshClientError, MeshClientResult};
use super::MeshClient;
use meshctl_common::MeshObject;
use std::marker::PhantomData;

pub struct ResourceClient<'a, T> {
    client: &'a MeshClient,
    _kind: PhantomData<T>,
}

impl<'a, T: MeshObject> ResourceClient<'a, T> {
    pub(crate) fn new(client: &'a MeshClient) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }

    /// Collection URL with `name` appended as one escaped path segment
    fn object_url(&self, name: &str) -> MeshClientResult<String> {
        let collection = self.client.collection_url::<T>();
        let mut url = reqwest::Url::parse(&collection)
            .map_err(|e| MeshClientError::InvalidUrl(format!("{}: {}", collection, e)))?;

        url.path_segments_mut()
            .map_err(|_| MeshClientError::InvalidUrl(collection.clone()))?
            .push(name);

        Ok(url.to_string())
    }

    /// Fetch one object by name
    pub async fn get(&self, name: &str) -> MeshClientResult<T> {
        let url = self.object_url(name)?;
        let reply = self.client.http().get(&url, None).await?;

        reply.handle_response(|body, status| {
            if status == 404 {
                return Err(not_found::<T>(name));
            }
            if status >= 300 {
                return Err(unexpected("GET", &url, status, body));
            }
            serde_json::from_slice(body).map_err(|source| MeshClientError::Decode {
                kind: T::KIND,
                source,
            })
        })
    }

    /// Create an object; an existing one with the same name is a conflict
    pub async fn create(&self, object: &T) -> MeshClientResult<()> {
        let url = self.client.collection_url::<T>();
        let reply = self.client.http().post(&url, object, None).await?;

        reply.handle_response(|body, status| match status {
            409 => Err(MeshClientError::Conflict {
                kind: T::KIND,
                name: object.name().to_string(),
            }),
            200..=299 => Ok(()),
            _ => Err(unexpected("POST", &url, status, body)),
        })
    }

    /// Replace an existing object
    pub async fn patch(&self, object: &T) -> MeshClientResult<()> {
        let url = self.object_url(object.name())?;
        let reply = self.client.http().put(&url, object, None).await?;

        reply.handle_response(|body, status| match status {
            404 => Err(not_found::<T>(object.name())),
            200..=299 => Ok(()),
            _ => Err(unexpected("PUT", &url, status, body)),
        })
    }

    pub async fn delete(&self, name: &str) -> MeshClientResult<()> {
        let url = self.object_url(name)?;
        let reply = self.client.http().delete(&url, None).await?;

        reply.handle_response(|body, status| match status {
            404 => Err(not_found::<T>(name)),
            200..=299 => Ok(()),
            _ => Err(unexpected("DELETE", &url, status, body)),
        })
    }

    pub async fn list(&self) -> MeshClientResult<Vec<T>> {
        let url = self.client.collection_url::<T>();
        let reply = self.client.http().get(&url, None).await?;

        reply.handle_response(|body, status| match status {
            404 => Err(not_found::<T>("*")),
            200..=299 => serde_json::from_slice(body).map_err(|source| MeshClientError::Decode {
                kind: T::KIND,
                source,
            }),
            _ => Err(unexpected("GET", &url, status, body)),
        })
    }

    /// Create the object, or replace it when it already exists
    pub async fn apply(&self, object: &T) -> MeshClientResult<()> {
        match self.create(object).await {
            Err(e) if e.is_conflict() => {
                tracing::debug!(kind = T::KIND, name = object.name(), "exists, updating instead");
                self.patch(object).await
            }
            other => other,
        }
    }
}

fn not_found<T: MeshObject>(name: &str) -> MeshClientError {
    MeshClientError::NotFound {
        kind: T::KIND,
        name: name.to_string(),
    }
}

fn unexpected(method: &'static str, url: &str, status: u16, body: &[u8]) -> MeshClientError {
    MeshClientError::UnexpectedStatus {
        method,
        url: url.to_string(),
        status,
        body: String::from_utf8_lossy(body).into_owned(),
    }
}
