//! The checkout coordinator.
//!
//! Listens to every intent and model change on the session bus, moves the
//! shopper between [`CheckoutStep`]s, and pushes view data. Handlers hold
//! only a weak reference to the coordinator, so dropping the last `Rc`
//! detaches it.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::task::{LocalSpawn, LocalSpawnExt};
use stall_bus::{BusEvent, EventKind, Selector, SubscriptionId};
use stall_commerce::buyer::{BuyerPatch, FieldGroup};
use stall_commerce::events::{EventFamily, ShopEvent, ShopEventKind};
use stall_commerce::CommerceError;
use stall_data::{ApiResult, OrderRequest, Receipt, ShopApi};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{CheckoutError, CheckoutResult};
use crate::session::AppSession;
use crate::step::CheckoutStep;
use crate::submission::{Fingerprint, SubmissionGuard};
use crate::views::{
    BasketData, CardData, FormData, GalleryData, HeaderData, ModalData, PreviewData, SuccessData,
    Views,
};

/// Contacts form notice when the basket emptied before the order went out.
pub const EMPTY_BASKET_MESSAGE: &str = "Basket is empty";

/// Drives the storefront from bus events.
pub struct CheckoutCoordinator {
    session: Rc<AppSession>,
    api: Rc<dyn ShopApi>,
    spawner: Rc<dyn LocalSpawn>,
    views: Views,
    config: SessionConfig,
    step: Cell<CheckoutStep>,
    guard: SubmissionGuard,
    notice: RefCell<Option<String>>,
    load_error: RefCell<Option<String>>,
    degraded: Cell<bool>,
    subscriptions: RefCell<Vec<SubscriptionId>>,
}

impl CheckoutCoordinator {
    /// Create a coordinator and subscribe it to the session bus.
    ///
    /// Order submissions run on `spawner`.
    pub fn attach(
        session: Rc<AppSession>,
        api: Rc<dyn ShopApi>,
        spawner: Rc<dyn LocalSpawn>,
        views: Views,
        config: SessionConfig,
    ) -> Rc<Self> {
        let coordinator = Rc::new(Self {
            session,
            api,
            spawner,
            views,
            config,
            step: Cell::new(CheckoutStep::Browsing),
            guard: SubmissionGuard::new(),
            notice: RefCell::new(None),
            load_error: RefCell::new(None),
            degraded: Cell::new(false),
            subscriptions: RefCell::new(Vec::new()),
        });

        let bus = coordinator.session.bus().clone();
        let subscriptions = vec![
            bus.subscribe(
                Selector::<ShopEventKind>::Family(EventFamily::Intent),
                Self::handler(&coordinator, Self::on_intent),
            ),
            bus.subscribe(
                Selector::<ShopEventKind>::Family(EventFamily::Catalog),
                Self::handler(&coordinator, Self::on_catalog_change),
            ),
            bus.subscribe(
                ShopEventKind::CartChanged,
                Self::handler(&coordinator, Self::on_cart_change),
            ),
            bus.subscribe(
                ShopEventKind::BuyerChanged,
                Self::handler(&coordinator, Self::on_buyer_change),
            ),
        ];
        debug!(handlers = subscriptions.len(), "checkout coordinator attached");
        *coordinator.subscriptions.borrow_mut() = subscriptions;

        coordinator.render_header();
        coordinator.render_basket();
        coordinator
    }

    fn handler(this: &Rc<Self>, f: fn(&Rc<Self>, &ShopEvent)) -> impl Fn(&ShopEvent) + 'static {
        let weak: Weak<Self> = Rc::downgrade(this);
        move |event: &ShopEvent| {
            if let Some(this) = weak.upgrade() {
                f(&this, event);
            }
        }
    }

    /// Current step.
    pub fn step(&self) -> CheckoutStep {
        self.step.get()
    }

    /// Check if an order submission is in flight.
    pub fn is_submitting(&self) -> bool {
        self.guard.is_busy()
    }

    /// Message shown on the contacts form after a failed submission.
    pub fn notice(&self) -> Option<String> {
        self.notice.borrow().clone()
    }

    /// Check if the catalog shown is the fallback list or a stale one.
    pub fn is_degraded(&self) -> bool {
        self.degraded.get()
    }

    pub fn session(&self) -> &Rc<AppSession> {
        &self.session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Fetch the product list into the catalog.
    ///
    /// On failure the fallback catalog is loaded when configured, and the
    /// gallery is marked degraded. Without a fallback the catalog is left as
    /// it was and the gallery shows the load error: empty on a first load,
    /// or the previous list marked degraded on a reload. Returns the number
    /// of products loaded.
    pub async fn load_catalog(&self) -> CheckoutResult<usize> {
        match self.api.fetch_catalog().await {
            Ok(items) => {
                let count = items.len();
                info!(count, "catalog loaded");
                self.degraded.set(false);
                *self.load_error.borrow_mut() = None;
                self.session.catalog().set_items(items);
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "catalog load failed");
                *self.load_error.borrow_mut() = Some(e.to_string());

                match &self.config.fallback_catalog {
                    Some(items) => {
                        info!(count = items.len(), "using fallback catalog");
                        self.degraded.set(true);
                        self.session.catalog().set_items(items.clone());
                        Ok(items.len())
                    }
                    None => {
                        // A failed reload keeps the last good catalog on screen, flagged as stale.
                        self.degraded.set(!self.session.catalog().is_empty());
                        self.render_gallery();
                        Err(CheckoutError::CatalogLoadFailed(e))
                    }
                }
            }
        }
    }

    fn on_intent(this: &Rc<Self>, event: &ShopEvent) {
        let from = this.step.get();
        match this.handle_intent(event) {
            Ok(()) => {}
            Err(e) if e.is_refusal() => {
                debug!(step = from.as_str(), intent = event.name(), reason = %e, "intent ignored");
            }
            Err(e @ CheckoutError::Commerce(_)) => {
                info!(step = from.as_str(), intent = event.name(), error = %e, "intent ignored");
            }
            Err(e) => {
                warn!(step = from.as_str(), intent = event.name(), error = %e, "intent failed");
            }
        }
    }

    fn handle_intent(self: &Rc<Self>, event: &ShopEvent) -> CheckoutResult<()> {
        let from = self.step.get();
        let target = from
            .target(event.kind())
            .ok_or_else(|| refused(from, event.kind(), "not available here"))?;

        let session = &self.session;
        match event {
            ShopEvent::ItemSelect { id } => {
                session.catalog().set_preview(id)?;
                self.enter(target);
            }
            ShopEvent::BasketOpen => {
                self.render_basket();
                self.enter(target);
            }
            ShopEvent::BasketAdd { id } => {
                let product = session.catalog().get_item(id)?;
                if !product.is_for_sale() {
                    return Err(CommerceError::NotForSale(id.to_string()).into());
                }
                session.cart().add(product);
                self.enter(target);
            }
            ShopEvent::BasketRemove { id } => {
                session.cart().remove(id);
                self.enter(target);
            }
            ShopEvent::BasketClear => {
                session.cart().clear();
            }
            ShopEvent::FieldChange { field, value } => {
                session
                    .buyer()
                    .set_fields(BuyerPatch::field(*field, value.clone()));
            }
            ShopEvent::CheckoutBegin => {
                if session.cart().is_empty() {
                    return Err(refused(from, event.kind(), "basket is empty"));
                }
                *self.notice.borrow_mut() = None;
                session.buyer().clear();
                self.enter(target);
            }
            ShopEvent::OrderSubmit => {
                if !session.buyer().validate().order_ready() {
                    self.render_form(FieldGroup::Order);
                    return Err(refused(from, event.kind(), "payment or address missing"));
                }
                self.render_form(FieldGroup::Contacts);
                self.enter(target);
            }
            ShopEvent::ContactsSubmit => {
                self.submit(from)?;
            }
            ShopEvent::ModalClose => {
                self.enter(target);
            }
            ShopEvent::CatalogChanged { .. }
            | ShopEvent::PreviewChanged { .. }
            | ShopEvent::CartChanged { .. }
            | ShopEvent::BuyerChanged(_) => {}
        }
        Ok(())
    }

    fn submit(self: &Rc<Self>, from: CheckoutStep) -> CheckoutResult<()> {
        let session = &self.session;
        if let Some(current) = self.guard.in_flight() {
            let order = OrderRequest::new(
                &session.buyer().state(),
                session.cart().total(),
                session.cart().item_ids(),
            );
            debug!(
                in_flight = %current,
                same_order = current == Fingerprint::of(&order),
                "order submission already in flight"
            );
            return Ok(());
        }
        if !session.buyer().validate().submit_ready() {
            self.render_form(FieldGroup::Contacts);
            return Err(refused(from, ShopEventKind::ContactsSubmit, "contact details missing"));
        }
        if session.cart().is_empty() {
            *self.notice.borrow_mut() = Some(EMPTY_BASKET_MESSAGE.to_string());
            self.render_form(FieldGroup::Contacts);
            return Err(refused(from, ShopEventKind::ContactsSubmit, "basket is empty"));
        }

        let order = OrderRequest::new(
            &session.buyer().state(),
            session.cart().total(),
            session.cart().item_ids(),
        );
        let fingerprint = Fingerprint::of(&order);
        let ticket = match self.guard.try_acquire(fingerprint) {
            Ok(ticket) => ticket,
            Err(current) => {
                debug!(in_flight = %current, "order submission already in flight");
                return Ok(());
            }
        };

        info!(fingerprint = %fingerprint, total = order.total, items = order.items.len(), "submitting order");
        *self.notice.borrow_mut() = None;
        self.render_form(FieldGroup::Contacts);

        let weak = Rc::downgrade(self);
        let api = Rc::clone(&self.api);
        self.spawner
            .spawn_local(async move {
                let result = api.submit_order(&order).await;
                debug!(fingerprint = %ticket.fingerprint(), ok = result.is_ok(), "order submission settled");
                drop(ticket);
                if let Some(this) = weak.upgrade() {
                    this.finish_submission(order.total, result);
                }
            })
            .map_err(|e| CheckoutError::SpawnFailed(e.to_string()))
    }

    fn finish_submission(&self, total: u64, result: ApiResult<Receipt>) {
        match result {
            Ok(receipt) => {
                info!(order_id = %receipt.id, total, "order placed");
                *self.notice.borrow_mut() = None;
                self.session.cart().clear();
                self.session.buyer().clear();
                self.views.success.render(&SuccessData::new(total, &self.config));
                self.enter(CheckoutStep::Success);
            }
            Err(e) => {
                let error = CheckoutError::SubmissionFailed(e);
                warn!(error = %error, step = self.step.get().as_str(), "order not placed");
                let message = if self.session.cart().is_empty() {
                    EMPTY_BASKET_MESSAGE.to_string()
                } else {
                    format!("{}. Please try again", error)
                };
                *self.notice.borrow_mut() = Some(message);
                self.render_form(FieldGroup::Contacts);
            }
        }
    }

    fn on_catalog_change(this: &Rc<Self>, event: &ShopEvent) {
        match event {
            ShopEvent::CatalogChanged { .. } => {
                this.render_gallery();
                if this.step.get() == CheckoutStep::Previewing
                    && this.session.catalog().preview().is_none()
                {
                    debug!("previewed product is gone, closing preview");
                    this.enter(CheckoutStep::Browsing);
                }
            }
            ShopEvent::PreviewChanged { item } => {
                let in_cart = this.session.cart().contains(&item.id);
                this.views
                    .preview
                    .render(&PreviewData::new(item, in_cart, &this.config));
            }
            _ => {}
        }
    }

    fn on_cart_change(this: &Rc<Self>, _event: &ShopEvent) {
        this.render_header();
        this.render_basket();
        if this.step.get() == CheckoutStep::Previewing {
            if let Some(item) = this.session.catalog().preview() {
                let in_cart = this.session.cart().contains(&item.id);
                this.views
                    .preview
                    .render(&PreviewData::new(&item, in_cart, &this.config));
            }
        }
    }

    fn on_buyer_change(this: &Rc<Self>, _event: &ShopEvent) {
        this.render_form(FieldGroup::Order);
        this.render_form(FieldGroup::Contacts);
    }

    fn enter(&self, step: CheckoutStep) {
        let from = self.step.replace(step);
        if from != step {
            info!(from = from.as_str(), to = step.as_str(), "checkout step changed");
        }
        self.views.modal.render(&ModalData { step });
    }

    fn render_gallery(&self) {
        let cards = self
            .session
            .catalog()
            .items()
            .iter()
            .map(|p| CardData::new(p, &self.config))
            .collect();
        self.views.gallery.render(&GalleryData {
            cards,
            degraded: self.degraded.get(),
            error: self.load_error.borrow().clone(),
        });
    }

    fn render_basket(&self) {
        let cart = self.session.cart();
        self.views
            .basket
            .render(&BasketData::new(&cart.items(), cart.total(), &self.config));
    }

    fn render_header(&self) {
        self.views.header.render(&HeaderData {
            count: self.session.cart().count(),
        });
    }

    fn render_form(&self, group: FieldGroup) {
        let state = self.session.buyer().state();
        let errors = self.session.buyer().validate();
        let contacts = group == FieldGroup::Contacts;

        let data = FormData {
            group,
            values: group
                .fields()
                .iter()
                .map(|f| (*f, state.get(*f).to_string()))
                .collect(),
            valid: errors.group_ready(group),
            errors: errors.messages_for(group).join(", "),
            notice: if contacts { self.notice() } else { None },
            submitting: contacts && self.guard.is_busy(),
        };
        self.views.form(group).render(&data);
    }
}

impl Drop for CheckoutCoordinator {
    fn drop(&mut self) {
        let bus = self.session.bus();
        for id in self.subscriptions.take() {
            bus.unsubscribe(id);
        }
        debug!("checkout coordinator detached");
    }
}

fn refused(from: CheckoutStep, intent: ShopEventKind, reason: &'static str) -> CheckoutError {
    CheckoutError::TransitionRefused {
        from,
        intent: intent.name(),
        reason,
    }
}
