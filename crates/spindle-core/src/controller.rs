// ── Array controller ──
//
// Full lifecycle management for the array console: snapshot polling,
// cache mirroring, action gating, and command dispatch. Rendering and
// transport live elsewhere; this is the seam between them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use spindle_api::models::{
    ActionMessage, ArrayOptionsUpdate, CreateArrayRequest, CreateCacheRequest, FormatDiskRequest,
};
use spindle_api::{ArrayServiceClient, TlsMode, TransportConfig};

use crate::cache::SnapshotCache;
use crate::command::{Command, CommandOutcome};
use crate::config::{ControllerConfig, TlsVerification};
use crate::eligibility;
use crate::error::CoreError;
use crate::gate::ActionGate;
use crate::model::{ArrayMember, AvailableDisk, DiskSnapshot, RaidArray, StatusSnapshot};
use crate::notify::{ConfirmPrompt, Notifier};

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Holds the last-known
/// snapshots in `watch` channels (wholesale replacement, no merging),
/// mirrors them into the [`SnapshotCache`], and serializes every
/// mutating operation through the [`ActionGate`].
#[derive(Clone)]
pub struct ArrayController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    client: ArrayServiceClient,
    cache: SnapshotCache,
    gate: ActionGate,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn ConfirmPrompt>,
    status: watch::Sender<Option<Arc<StatusSnapshot>>>,
    disks: watch::Sender<Option<Arc<DiskSnapshot>>>,
    cancel: CancellationToken,
    /// Child token for the current activation -- cancelled on
    /// deactivate, replaced on the next activate.
    active_cancel: Mutex<CancellationToken>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ArrayController {
    /// Create a controller with an in-memory snapshot cache. Does NOT
    /// fetch anything -- call [`activate()`](Self::activate) for a
    /// long-lived view or [`oneshot()`](Self::oneshot) for a single
    /// invocation.
    pub fn new(
        config: ControllerConfig,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn ConfirmPrompt>,
    ) -> Result<Self, CoreError> {
        Self::with_cache(config, notifier, confirm, SnapshotCache::in_memory())
    }

    /// Create a controller backed by an existing cache, so multiple
    /// views share warm snapshots.
    pub fn with_cache(
        config: ControllerConfig,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn ConfirmPrompt>,
        cache: SnapshotCache,
    ) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = ArrayServiceClient::new(config.url.clone(), &transport)?;
        let (status, _) = watch::channel(None);
        let (disks, _) = watch::channel(None);
        let cancel = CancellationToken::new();
        let active_cancel = Mutex::new(cancel.child_token());

        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                client,
                cache,
                gate: ActionGate::new(),
                notifier,
                confirm,
                status,
                disks,
                cancel,
                active_cancel,
                tasks: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Create a controller and fetch both snapshots exactly once, with
    /// no background tasks. The mode single CLI invocations use.
    ///
    /// A failed status fetch is fatal (there is nothing to show); a
    /// failed disk fetch is not -- commands that need the inventory
    /// report the missing snapshot when dispatched.
    pub async fn oneshot(
        config: ControllerConfig,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn ConfirmPrompt>,
    ) -> Result<Self, CoreError> {
        let controller = Self::new(config, notifier, confirm)?;
        let (status_res, disks_res) =
            tokio::join!(controller.refresh_status(), controller.refresh_disks());
        status_res?;
        if let Err(e) = disks_res {
            debug!(error = %e, "disk inventory unavailable");
        }
        Ok(controller)
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    // ── Snapshot access ──────────────────────────────────────────

    /// Subscribe to status snapshot replacements.
    pub fn subscribe_status(&self) -> watch::Receiver<Option<Arc<StatusSnapshot>>> {
        self.inner.status.subscribe()
    }

    /// Subscribe to disk inventory replacements.
    pub fn subscribe_disks(&self) -> watch::Receiver<Option<Arc<DiskSnapshot>>> {
        self.inner.disks.subscribe()
    }

    /// The current status snapshot, if any poll has succeeded (or the
    /// cache was warm).
    pub fn status_snapshot(&self) -> Option<Arc<StatusSnapshot>> {
        self.inner.status.borrow().clone()
    }

    pub fn disk_snapshot(&self) -> Option<Arc<DiskSnapshot>> {
        self.inner.disks.borrow().clone()
    }

    /// The shared busy flag: true while a mutating operation is in
    /// flight. Every affordance consumer renders disabled while set.
    pub fn is_busy(&self) -> bool {
        self.inner.gate.is_busy()
    }

    // ── View lifecycle ───────────────────────────────────────────

    /// Bring the controller live for a mounted view: seed from the
    /// snapshot cache, fetch immediately, then poll on the configured
    /// periods until [`deactivate()`](Self::deactivate).
    ///
    /// Fetch failures are reported through the notifier and never
    /// fatal -- the next tick retries.
    pub async fn activate(&self) {
        let child = self.inner.cancel.child_token();
        *self.inner.active_cancel.lock().await = child.clone();

        // Warm start: show cached data instantly while the first poll
        // is in flight. Expired entries are not served.
        if self.inner.status.borrow().is_none() {
            if let Some(snapshot) = self.inner.cache.read_status() {
                debug!("status seeded from cache");
                let _ = self.inner.status.send(Some(Arc::new(snapshot)));
            }
        }
        if self.inner.disks.borrow().is_none() {
            if let Some(snapshot) = self.inner.cache.read_disks() {
                debug!("disk inventory seeded from cache");
                let _ = self.inner.disks.send(Some(Arc::new(snapshot)));
            }
        }

        self.poll_status_once().await;
        self.poll_disks_once().await;

        let mut tasks = self.inner.tasks.lock().await;
        tasks.push(tokio::spawn(status_poll_task(
            self.clone(),
            self.inner.config.status_poll_interval,
            child.clone(),
        )));
        tasks.push(tokio::spawn(disk_poll_task(
            self.clone(),
            self.inner.config.disk_poll_interval,
            child,
        )));
        info!("array controller activated");
    }

    /// Tear down the poll tasks. Deterministic: returns only after both
    /// tasks have exited, so no timer outlives the view.
    pub async fn deactivate(&self) {
        self.inner.active_cancel.lock().await.cancel();

        let mut tasks = self.inner.tasks.lock().await;
        for handle in tasks.drain(..) {
            let _ = handle.await;
        }
        debug!("array controller deactivated");
    }

    // ── Refresh paths ────────────────────────────────────────────

    /// Fetch array status and wholesale-replace the held snapshot,
    /// mirroring it into the cache. The one path every refresh --
    /// periodic, manual, or post-command -- goes through.
    pub async fn refresh_status(&self) -> Result<(), CoreError> {
        let response = self.inner.client.get_raid_status().await?;
        let snapshot = Arc::new(StatusSnapshot::from_wire(response));
        self.inner.cache.write_status(&snapshot);
        let _ = self.inner.status.send(Some(Arc::clone(&snapshot)));
        debug!(arrays = snapshot.arrays.len(), "status snapshot replaced");
        Ok(())
    }

    /// Fetch the disk inventory and wholesale-replace the held snapshot.
    pub async fn refresh_disks(&self) -> Result<(), CoreError> {
        let response = self.inner.client.get_available_disks().await?;
        let snapshot = Arc::new(DiskSnapshot::from_wire(response));
        self.inner.cache.write_disks(&snapshot);
        let _ = self.inner.disks.send(Some(Arc::clone(&snapshot)));
        debug!(disks = snapshot.disks.len(), "disk snapshot replaced");
        Ok(())
    }

    /// Operator-requested refresh: same fetch-and-replace path as the
    /// periodic tick, plus an explicit acknowledgment (the periodic
    /// case stays silent on success).
    pub async fn refresh_now(&self) {
        match tokio::join!(self.refresh_status(), self.refresh_disks()) {
            (Ok(()), Ok(())) => self.inner.notifier.notify_success("Status refreshed"),
            (Err(e), _) | (_, Err(e)) => self
                .inner
                .notifier
                .notify_error(&format!("Refresh failed: {}", e.operator_message())),
        }
    }

    /// One periodic status poll: failures are notified and the previous
    /// snapshot is retained -- stale-but-present beats a blank view.
    async fn poll_status_once(&self) {
        if let Err(e) = self.refresh_status().await {
            warn!(error = %e, "status refresh failed, keeping previous snapshot");
            self.inner
                .notifier
                .notify_error(&format!("Status refresh failed: {}", e.operator_message()));
        }
    }

    async fn poll_disks_once(&self) {
        if let Err(e) = self.refresh_disks().await {
            warn!(error = %e, "disk refresh failed, keeping previous snapshot");
            self.inner
                .notifier
                .notify_error(&format!("Disk refresh failed: {}", e.operator_message()));
        }
    }

    // ── Command dispatch ─────────────────────────────────────────

    /// Execute exactly one validated mutating action.
    ///
    /// Per invocation: local input validation (no gate), confirmation
    /// for irreversible actions (no gate), gate acquisition, defensive
    /// re-validation through the eligibility predicates, one remote
    /// call. On success the service's message goes to the notifier, the
    /// gate is released, and a forced re-poll runs so the operator sees
    /// authoritative post-action state immediately. On failure the error
    /// is notified, the gate is released, and no re-poll happens --
    /// state is presumed unchanged.
    pub async fn execute(&self, cmd: Command) -> Result<CommandOutcome, CoreError> {
        cmd.validate_input()?;

        if let Command::DeleteArray { array, .. } = &cmd {
            let prompt = format!("Delete array '{array}'? This cannot be undone.");
            if !self.inner.confirm.confirm(&prompt) {
                debug!(array, "array deletion declined");
                return Ok(CommandOutcome::Declined);
            }
        }

        let Some(permit) = self.inner.gate.try_acquire() else {
            return Err(CoreError::Busy);
        };

        let status = self.inner.status.borrow().clone();
        let disks = self.inner.disks.borrow().clone();
        self.revalidate(&cmd, status.as_deref(), disks.as_deref())?;

        debug!(command = cmd.kind(), "dispatching");
        match self.route(&cmd, status.as_deref()).await {
            Ok(ack) => {
                info!(command = cmd.kind(), "command accepted");
                self.inner.notifier.notify_success(&ack.message);
                // Release before the forced re-poll: the mutation is
                // over, only observation remains.
                drop(permit);
                self.force_repoll(&cmd).await;
                Ok(CommandOutcome::Applied {
                    message: ack.message,
                })
            }
            Err(e) => {
                warn!(command = cmd.kind(), error = %e, "command failed");
                self.inner.notifier.notify_error(&e.operator_message());
                drop(permit);
                Err(e)
            }
        }
    }

    /// Re-check the eligibility predicate for the command against the
    /// current snapshots. The UI already disables illegal affordances;
    /// this guards against dispatching from a stale view.
    #[allow(clippy::too_many_lines)]
    fn revalidate(
        &self,
        cmd: &Command,
        status: Option<&StatusSnapshot>,
        disks: Option<&DiskSnapshot>,
    ) -> Result<(), CoreError> {
        match cmd {
            Command::MarkDeviceFailed { array, device } => {
                let arr = require_array(status, array)?;
                if let Some(device) = device {
                    let member = require_member(arr, device)?;
                    if !eligibility::can_mark_failed(member) {
                        return Err(not_allowed(cmd, member));
                    }
                }
            }
            Command::StartRebuild { array, device } => {
                let member = require_member(require_array(status, array)?, device)?;
                if !eligibility::can_start_rebuild(member) {
                    return Err(not_allowed(cmd, member));
                }
            }
            Command::FinalizeRebuild { array } => {
                let arr = require_array(status, array)?;
                if !eligibility::should_offer_finalize(arr) {
                    return Err(CoreError::NotAllowed {
                        action: cmd.kind().into(),
                        reason: format!("array {} is {}", arr.name, arr.status),
                    });
                }
            }
            Command::ToggleBitmap { array } | Command::TriggerScrub { array } => {
                require_array(status, array)?;
            }
            Command::AddSpare { array, .. } => {
                // The spare is a fresh disk, not yet a member; only the
                // target array needs to exist.
                require_array(status, array)?;
            }
            Command::RemoveDevice { array, device } => {
                let member = require_member(require_array(status, array)?, device)?;
                if !eligibility::can_remove_spare(member) {
                    return Err(not_allowed(cmd, member));
                }
            }
            Command::SetWriteMostly { array, device, .. } => {
                let member = require_member(require_array(status, array)?, device)?;
                if !eligibility::can_toggle_write_mostly(member) {
                    return Err(not_allowed(cmd, member));
                }
            }
            Command::SetSpeedLimits { .. } => {
                // Global limits, but the wire op targets an array; one
                // must exist to carry the update.
                let snap = status.ok_or(CoreError::NoSnapshot)?;
                if snap.arrays.is_empty() {
                    return Err(CoreError::NotAllowed {
                        action: cmd.kind().into(),
                        reason: "no arrays exist".into(),
                    });
                }
            }
            Command::DeleteArray { array, .. } => {
                let arr = require_array(status, array)?;
                // Always offered; the service refuses unsafe deletions.
                debug_assert!(eligibility::can_delete_array(arr));
            }
            Command::FormatDisk { disk, .. } => {
                let target = require_disk(disks, disk)?;
                if !eligibility::can_format(target) {
                    return Err(CoreError::NotAllowed {
                        action: cmd.kind().into(),
                        reason: format!("disk {} is in use", target.name),
                    });
                }
            }
            Command::CreateArray { disks: names, .. } => {
                let snap = disks.ok_or(CoreError::NoSnapshot)?;
                if !eligibility::can_create_array(&snap.disks) {
                    return Err(CoreError::NotAllowed {
                        action: cmd.kind().into(),
                        reason: "fewer than two free disks".into(),
                    });
                }
                for name in names {
                    let disk = require_disk(Some(snap), name)?;
                    if disk.in_raid || disk.is_os_disk {
                        return Err(CoreError::NotAllowed {
                            action: cmd.kind().into(),
                            reason: format!("disk {} is not free", disk.name),
                        });
                    }
                }
            }
            Command::CreateCache { array, disks: names } => {
                let arr = require_array(status, array)?;
                let snap = disks.ok_or(CoreError::NoSnapshot)?;
                if !eligibility::can_setup_cache(arr, &snap.disks) {
                    return Err(CoreError::NotAllowed {
                        action: cmd.kind().into(),
                        reason: format!("array {} cannot take a cache", arr.name),
                    });
                }
                for name in names {
                    let disk = require_disk(Some(snap), name)?;
                    if !eligibility::cache_candidate(disk) {
                        return Err(CoreError::NotAllowed {
                            action: cmd.kind().into(),
                            reason: format!("disk {} is not a cache candidate", disk.name),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Translate the command into its single remote call.
    async fn route(
        &self,
        cmd: &Command,
        status: Option<&StatusSnapshot>,
    ) -> Result<ActionMessage, CoreError> {
        let client = &self.inner.client;
        let ack = match cmd {
            Command::MarkDeviceFailed { array, device } => {
                client.mark_device_failed(array, device.as_deref()).await?
            }
            Command::StartRebuild { array, device } => {
                client.start_rebuild(array, device).await?
            }
            Command::FinalizeRebuild { array } => client.finalize_rebuild(array).await?,
            Command::ToggleBitmap { array } => {
                let arr = require_array(status, array)?;
                let options = ArrayOptionsUpdate {
                    enable_bitmap: Some(arr.bitmap.is_none()),
                    ..ArrayOptionsUpdate::default()
                };
                client.update_array_options(array, &options).await?
            }
            Command::TriggerScrub { array } => {
                let options = ArrayOptionsUpdate {
                    trigger_scrub: Some(true),
                    ..ArrayOptionsUpdate::default()
                };
                client.update_array_options(array, &options).await?
            }
            Command::AddSpare { array, device } => {
                let options = ArrayOptionsUpdate {
                    add_spare: Some(device.trim().to_owned()),
                    ..ArrayOptionsUpdate::default()
                };
                client.update_array_options(array, &options).await?
            }
            Command::RemoveDevice { array, device } => {
                let options = ArrayOptionsUpdate {
                    remove_device: Some(device.clone()),
                    ..ArrayOptionsUpdate::default()
                };
                client.update_array_options(array, &options).await?
            }
            Command::SetWriteMostly {
                array,
                device,
                enabled,
            } => {
                let options = ArrayOptionsUpdate {
                    write_mostly_device: Some(device.clone()),
                    write_mostly: Some(*enabled),
                    ..ArrayOptionsUpdate::default()
                };
                client.update_array_options(array, &options).await?
            }
            Command::SetSpeedLimits { minimum, maximum } => {
                // The limits are global; any existing array is a valid
                // wire target. revalidate() guaranteed one exists.
                let snap = status.ok_or(CoreError::NoSnapshot)?;
                let target = snap
                    .arrays
                    .first()
                    .ok_or(CoreError::NoSnapshot)?
                    .name
                    .clone();
                let options = ArrayOptionsUpdate {
                    speed_limit_min: *minimum,
                    speed_limit_max: *maximum,
                    ..ArrayOptionsUpdate::default()
                };
                client.update_array_options(&target, &options).await?
            }
            Command::DeleteArray { array, force } => client.delete_array(array, *force).await?,
            Command::FormatDisk {
                disk,
                filesystem,
                label,
            } => {
                let request = FormatDiskRequest {
                    filesystem: filesystem.clone(),
                    label: label.clone(),
                };
                client.format_disk(disk, &request).await?
            }
            Command::CreateArray { disks, level } => {
                let request = CreateArrayRequest {
                    disks: disks.clone(),
                    level: level.clone(),
                };
                client.create_array(&request).await?
            }
            Command::CreateCache { array, disks } => {
                let request = CreateCacheRequest {
                    disks: disks.clone(),
                };
                client.create_cache(array, &request).await?
            }
        };
        Ok(ack)
    }

    /// Forced out-of-band re-poll after a successful command, issued
    /// strictly after the command response was observed. Commands that
    /// alter the physical inventory refresh the disk list too.
    async fn force_repoll(&self, cmd: &Command) {
        self.poll_status_once().await;

        if matches!(
            cmd,
            Command::FormatDisk { .. }
                | Command::CreateArray { .. }
                | Command::CreateCache { .. }
                | Command::DeleteArray { .. }
        ) {
            self.poll_disks_once().await;
        }
    }
}

// ── Lookup helpers ───────────────────────────────────────────────

fn require_array<'a>(
    status: Option<&'a StatusSnapshot>,
    name: &str,
) -> Result<&'a RaidArray, CoreError> {
    let snap = status.ok_or(CoreError::NoSnapshot)?;
    snap.array(name).ok_or_else(|| CoreError::NotFound {
        entity: "array".into(),
        identifier: name.into(),
    })
}

fn require_member<'a>(array: &'a RaidArray, name: &str) -> Result<&'a ArrayMember, CoreError> {
    array.device(name).ok_or_else(|| CoreError::NotFound {
        entity: "device".into(),
        identifier: name.into(),
    })
}

fn require_disk<'a>(
    disks: Option<&'a DiskSnapshot>,
    name: &str,
) -> Result<&'a AvailableDisk, CoreError> {
    let snap = disks.ok_or(CoreError::NoSnapshot)?;
    snap.disk(name).ok_or_else(|| CoreError::NotFound {
        entity: "disk".into(),
        identifier: name.into(),
    })
}

fn not_allowed(cmd: &Command, member: &ArrayMember) -> CoreError {
    CoreError::NotAllowed {
        action: cmd.kind().into(),
        reason: format!("device {} is {}", member.name, member.state),
    }
}

fn build_transport(config: &ControllerConfig) -> TransportConfig {
    let tls = match &config.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    };
    TransportConfig {
        tls,
        timeout: config.timeout,
        api_token: config.api_token.clone(),
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically refresh array status until cancelled.
async fn status_poll_task(
    controller: ArrayController,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick; activation already fetched

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }
        // A response still in flight at teardown is discarded with the
        // future, never applied to torn-down state.
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = controller.poll_status_once() => {}
        }
    }
}

/// Periodically refresh the disk inventory until cancelled.
async fn disk_poll_task(controller: ArrayController, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = controller.poll_disks_once() => {}
        }
    }
}
