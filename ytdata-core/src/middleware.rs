use std::future::{ready, Ready};

use actix_web::dev::{
    forward_ready, Extensions, Service, ServiceRequest, ServiceResponse, Transform,
};
use actix_web::{Error, HttpMessage};

use crate::cache::{CacheReader, ChannelVideos};

/// Attaches the poller's current data to every request.
///
/// Handlers read it back with `web::ReqData<ChannelVideos>`, or
/// `web::ReqData<ChannelSnapshot>` when the poller also fetches the channel profile.
#[derive(Debug, Clone)]
pub struct ChannelDataLayer {
    reader: CacheReader,
    include_profile: bool,
}

impl ChannelDataLayer {
    pub fn new(reader: CacheReader, include_profile: bool) -> Self {
        Self {
            reader,
            include_profile,
        }
    }

    pub fn attach(&self, extensions: &mut Extensions) {
        if self.include_profile {
            extensions.insert(self.reader.snapshot());
        } else {
            extensions.insert(ChannelVideos(self.reader.videos()));
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ChannelDataLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ChannelDataInstance<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ChannelDataInstance {
            service,
            layer: self.clone(),
        }))
    }
}

pub struct ChannelDataInstance<S> {
    service: S,
    layer: ChannelDataLayer,
}

impl<S, B> Service<ServiceRequest> for ChannelDataInstance<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = S::Future;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        self.layer.attach(&mut req.extensions_mut());
        self.service.call(req)
    }
}
