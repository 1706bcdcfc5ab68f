//! CRUD wrappers for REST resources

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::http::{ApiError, HttpClient, RequestOptions, Transport};
use crate::core::models::{Customer, Page, WorkOrder};

pub const CUSTOMERS_PATH: &str = "/api/customers";
pub const WORK_ORDERS_PATH: &str = "/api/work-orders";

/// `index`/`find`/`store`/`update`/`destroy` over one resource path
pub struct ResourceService<T, M> {
    http: Arc<HttpClient<T>>,
    base_path: &'static str,
    _model: PhantomData<fn() -> M>,
}

impl<T, M> Clone for ResourceService<T, M> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            base_path: self.base_path,
            _model: PhantomData,
        }
    }
}

impl<T: Transport, M: DeserializeOwned> ResourceService<T, M> {
    pub fn new(http: Arc<HttpClient<T>>, base_path: &'static str) -> Self {
        Self {
            http,
            base_path,
            _model: PhantomData,
        }
    }

    pub fn base_path(&self) -> &'static str {
        self.base_path
    }

    fn member_path(&self, id: u64) -> String {
        format!("{}/{}", self.base_path, id)
    }

    /// Paginated listing; `options.query` carries `page`, filters, etc.
    pub async fn index(&self, options: &RequestOptions) -> Result<Page<M>, ApiError> {
        self.http.get_with_query(self.base_path, options).await
    }

    pub async fn find(&self, id: u64) -> Result<M, ApiError> {
        self.http.get(&self.member_path(id)).await
    }

    pub async fn store<P: Serialize + ?Sized>(&self, payload: &P) -> Result<M, ApiError> {
        self.http.post(self.base_path, payload).await
    }

    pub async fn update<P: Serialize + ?Sized>(&self, id: u64, payload: &P) -> Result<M, ApiError> {
        self.http.put(&self.member_path(id), payload).await
    }

    pub async fn destroy(&self, id: u64) -> Result<(), ApiError> {
        self.http.delete(&self.member_path(id)).await
    }
}

pub type CustomerService<T> = ResourceService<T, Customer>;
pub type WorkOrderService<T> = ResourceService<T, WorkOrder>;

pub fn customers<T: Transport>(http: Arc<HttpClient<T>>) -> CustomerService<T> {
    ResourceService::new(http, CUSTOMERS_PATH)
}

pub fn work_orders<T: Transport>(http: Arc<HttpClient<T>>) -> WorkOrderService<T> {
    ResourceService::new(http, WORK_ORDERS_PATH)
}
