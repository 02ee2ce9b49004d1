//! Lazy, memoized resource directory.

use parking_lot::Mutex;

use crate::{
    api,
    error::{Error, Result},
    trans::Transport,
};

/// Cache of the server's resource-name to endpoint-URI mapping.
///
/// Fetched at most once per engine lifetime and never invalidated: if the server drops a
/// resource after the fetch, lookups for it fail for the rest of the process.
#[derive(Debug)]
pub(crate) struct DirectoryCache {
    url: String,
    resources: Mutex<Option<api::Resources>>,
}

impl DirectoryCache {
    pub fn new(url: &str) -> Self {
        DirectoryCache {
            url: url.to_owned(),
            resources: Mutex::new(None),
        }
    }

    /// Resolve `resource` to its endpoint URI, fetching the directory on first use.
    ///
    /// The fetch goes through the transport so the response's nonce lands in the pool.
    pub async fn resolve(&self, trans: &Transport, resource: &str) -> Result<String> {
        // lock is never held across the fetch; the engine drives one request at a time
        if let Some(resources) = &*self.resources.lock() {
            return lookup(resources, resource);
        }

        log::debug!("Fetch directory: {}", self.url);
        let res = trans.get(&self.url, None).await?;

        if res.status != reqwest::StatusCode::OK {
            return Err(Error::Directory {
                status: res.status,
                body: res.body.to_string(),
            });
        }

        let resources = res.body.json::<api::Resources>()?;
        let endpoint = lookup(&resources, resource);
        *self.resources.lock() = Some(resources);

        endpoint
    }
}

fn lookup(resources: &api::Resources, resource: &str) -> Result<String> {
    resources
        .endpoint(resource)
        .map(ToOwned::to_owned)
        .ok_or_else(|| Error::UnknownResource(resource.to_owned()))
}

#[cfg(test)]
mod tests {
    use std::sync::{atomic::Ordering, Arc};

    use super::*;
    use crate::{trans::NoncePool, Account};

    fn test_transport(dir_url: &str) -> Transport {
        let key = rsa::RsaPrivateKey::new(&mut rand::thread_rng(), 512).unwrap();
        let account = Account::new(key).unwrap();
        Transport::new(
            reqwest::Client::new(),
            Arc::new(NoncePool::new(dir_url)),
            account,
        )
    }

    #[tokio::test]
    async fn test_resolve_memoizes() {
        let server = crate::test::with_directory_server();
        let trans = test_transport(&server.dir_url);
        let dir = DirectoryCache::new(&server.dir_url);

        let new_reg = dir.resolve(&trans, "new-reg").await.unwrap();
        assert!(new_reg.ends_with("/acme/new-reg"));

        // different resources, same single fetch
        dir.resolve(&trans, "new-authz").await.unwrap();
        dir.resolve(&trans, "new-cert").await.unwrap();
        assert_eq!(server.hits.directory.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resolve_unknown_resource() {
        let server = crate::test::with_directory_server();
        let trans = test_transport(&server.dir_url);
        let dir = DirectoryCache::new(&server.dir_url);

        let err = dir.resolve(&trans, "new-frobnicate").await.unwrap_err();
        assert!(matches!(err, Error::UnknownResource(name) if name == "new-frobnicate"));
    }

    #[tokio::test]
    async fn test_directory_fetch_failure() {
        let trans = test_transport("http://127.0.0.1:1/directory");
        let dir = DirectoryCache::new("http://127.0.0.1:1/directory");

        let err = dir.resolve(&trans, "new-reg").await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }
}
