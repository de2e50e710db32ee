//! Test doubles for driving a coordinator without a UI or a server.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use stall_commerce::{OrderId, Product};
use stall_data::{ApiError, ApiResult, OrderRequest, Receipt, ShopApi};

use crate::views::{
    BasketData, FormData, GalleryData, HeaderData, ModalData, PreviewData, Render, SuccessData,
    Views,
};

/// A view that keeps everything it is asked to render.
///
/// Clones share the same log.
pub struct RecordingView<D> {
    frames: Rc<RefCell<Vec<D>>>,
}

impl<D: Clone> RecordingView<D> {
    pub fn new() -> Self {
        Self {
            frames: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Every render, oldest first.
    pub fn frames(&self) -> Vec<D> {
        self.frames.borrow().clone()
    }

    /// The most recent render.
    pub fn last(&self) -> Option<D> {
        self.frames.borrow().last().cloned()
    }

    /// Number of renders.
    pub fn count(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn clear(&self) {
        self.frames.borrow_mut().clear();
    }
}

impl<D: Clone> Default for RecordingView<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Clone for RecordingView<D> {
    fn clone(&self) -> Self {
        Self {
            frames: Rc::clone(&self.frames),
        }
    }
}

impl<D: Clone> Render<D> for RecordingView<D> {
    fn render(&self, data: &D) {
        self.frames.borrow_mut().push(data.clone());
    }
}

/// One recording view per view slot.
#[derive(Clone, Default)]
pub struct ViewLog {
    pub gallery: RecordingView<GalleryData>,
    pub preview: RecordingView<PreviewData>,
    pub basket: RecordingView<BasketData>,
    pub header: RecordingView<HeaderData>,
    pub order_form: RecordingView<FormData>,
    pub contacts_form: RecordingView<FormData>,
    pub success: RecordingView<SuccessData>,
    pub modal: RecordingView<ModalData>,
}

impl ViewLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Views that write into this log.
    pub fn views(&self) -> Views {
        Views {
            gallery: Rc::new(self.gallery.clone()),
            preview: Rc::new(self.preview.clone()),
            basket: Rc::new(self.basket.clone()),
            header: Rc::new(self.header.clone()),
            order_form: Rc::new(self.order_form.clone()),
            contacts_form: Rc::new(self.contacts_form.clone()),
            success: Rc::new(self.success.clone()),
            modal: Rc::new(self.modal.clone()),
        }
    }
}

struct PendingOrder {
    total: u64,
    reply: oneshot::Sender<ApiResult<Receipt>>,
}

/// An API whose order responses are released by the test.
///
/// `submit_order` parks until [`ScriptedApi::accept_next`] or
/// [`ScriptedApi::fail_next`] answers it, so tests can act while a
/// submission is in flight.
pub struct ScriptedApi {
    catalog: RefCell<ApiResult<Vec<Product>>>,
    pending: RefCell<VecDeque<PendingOrder>>,
    submitted: RefCell<Vec<OrderRequest>>,
}

impl ScriptedApi {
    /// Serve a fixed catalog.
    pub fn new(items: Vec<Product>) -> Self {
        Self {
            catalog: RefCell::new(Ok(items)),
            pending: RefCell::new(VecDeque::new()),
            submitted: RefCell::new(Vec::new()),
        }
    }

    /// Fail every catalog fetch.
    pub fn failing_catalog(error: ApiError) -> Self {
        let api = Self::new(Vec::new());
        *api.catalog.borrow_mut() = Err(error);
        api
    }

    /// Replace the catalog served by later fetches.
    pub fn set_catalog(&self, items: Vec<Product>) {
        *self.catalog.borrow_mut() = Ok(items);
    }

    /// Make later catalog fetches fail.
    pub fn fail_catalog(&self, error: ApiError) {
        *self.catalog.borrow_mut() = Err(error);
    }

    /// Orders received so far.
    pub fn submitted(&self) -> Vec<OrderRequest> {
        self.submitted.borrow().clone()
    }

    /// Number of orders waiting for an answer.
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Answer the oldest waiting order with a receipt.
    pub fn accept_next(&self) -> bool {
        self.answer_next(|order| {
            Ok(Receipt {
                id: OrderId::generate(),
                total: order.total,
                accepted_at: None,
            })
        })
    }

    /// Answer the oldest waiting order with an error.
    pub fn fail_next(&self, error: ApiError) -> bool {
        self.answer_next(|_| Err(error))
    }

    fn answer_next(&self, answer: impl FnOnce(&PendingOrder) -> ApiResult<Receipt>) -> bool {
        let Some(order) = self.pending.borrow_mut().pop_front() else {
            return false;
        };
        let result = answer(&order);
        order.reply.send(result).is_ok()
    }
}

#[async_trait(?Send)]
impl ShopApi for ScriptedApi {
    async fn fetch_catalog(&self) -> ApiResult<Vec<Product>> {
        self.catalog.borrow().clone()
    }

    async fn submit_order(&self, order: &OrderRequest) -> ApiResult<Receipt> {
        let (reply, receiver) = oneshot::channel();
        self.submitted.borrow_mut().push(order.clone());
        self.pending.borrow_mut().push_back(PendingOrder {
            total: order.total,
            reply,
        });

        receiver
            .await
            .unwrap_or_else(|_| Err(ApiError::Network("request dropped".to_string())))
    }
}
