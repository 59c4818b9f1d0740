use crate::geo::Wgs84;
use crate::outline::FrustumOutline;
use crate::scene::{CoverageStyle, SceneBackend};
use crate::sensor::SensorView;
use crate::shader::{ShaderHandle, ShaderState};
use crate::shadow::{ShadowCamera, ShadowCaster};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, warn};

/// Identity of a device's sensor within a [`CoverageLayer`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SensorId(String);

impl SensorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SensorId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for SensorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

struct SensorEntry<B: SceneBackend> {
    origin: Wgs84,
    view: SensorView,
    selected: bool,
    caster: Option<ShadowCaster<B>>,
    /// Latched after a resource failure; cleared when parameters change so
    /// creation is retried.
    create_failed: bool,
}

/// The render loop's collection of coverage overlays, one entry per sensor.
///
/// Owns every shadow caster explicitly and serializes teardown before any
/// recreate of the same sensor; all work happens on the single render
/// thread that calls [`CoverageLayer::tick`].
pub struct CoverageLayer<B: SceneBackend> {
    style: CoverageStyle,
    shader: ShaderHandle,
    sensors: HashMap<SensorId, SensorEntry<B>>,
}

impl<B: SceneBackend> CoverageLayer<B> {
    pub fn new(style: CoverageStyle, shader: ShaderHandle) -> Self {
        Self {
            style,
            shader,
            sensors: HashMap::new(),
        }
    }

    pub fn style(&self) -> &CoverageStyle {
        &self.style
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn has_active_shadow(&self, id: &SensorId) -> bool {
        self.sensors
            .get(id)
            .is_some_and(|entry| entry.caster.is_some())
    }

    /// Records or refreshes a sensor. A live caster is re-pointed in place
    /// by the next [`CoverageLayer::tick`]; resources are never recreated
    /// just because parameters moved.
    pub fn upsert(&mut self, id: impl Into<SensorId>, origin: Wgs84, view: SensorView) {
        match self.sensors.entry(id.into()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.origin = origin;
                entry.view = view;
                entry.create_failed = false;
            }
            Entry::Vacant(vacant) => {
                vacant.insert(SensorEntry {
                    origin,
                    view,
                    selected: false,
                    caster: None,
                    create_failed: false,
                });
            }
        }
    }

    /// Selection gates both the outline and the shadow overlay; deselection
    /// tears the sensor's shadow resources down immediately.
    pub fn set_selected(&mut self, backend: &mut B, id: &SensorId, selected: bool) {
        let Some(entry) = self.sensors.get_mut(id) else {
            return;
        };

        entry.selected = selected;
        if !selected && let Some(mut caster) = entry.caster.take() {
            caster.destroy(backend);
        }
    }

    pub fn remove(&mut self, backend: &mut B, id: &SensorId) {
        if let Some(mut entry) = self.sensors.remove(id)
            && let Some(mut caster) = entry.caster.take()
        {
            caster.destroy(backend);
        }
    }

    /// Tears down every sensor's resources, keeping the sensor records.
    pub fn suspend_all(&mut self, backend: &mut B) {
        for entry in self.sensors.values_mut() {
            if let Some(mut caster) = entry.caster.take() {
                caster.destroy(backend);
            }
        }
    }

    /// Per-frame pre-update: applies the distance gate, creates or destroys
    /// casters as their conditions change, re-points live light cameras,
    /// runs the per-frame stage hooks, and submits outline polylines for
    /// selected sensors.
    pub fn tick(&mut self, backend: &mut B) {
        let viewing_camera = backend.camera_position();
        let exclude_terrain = backend.terrain_is_flat();

        for (id, entry) in self.sensors.iter_mut() {
            let camera = match entry.selected {
                true => ShadowCamera::synthesize(&entry.origin, &entry.view),
                false => None,
            };

            let wanted = camera
                .as_ref()
                .is_some_and(|camera| camera.within_activation_range(&viewing_camera));

            match (wanted, camera) {
                (true, Some(camera)) => {
                    match entry.caster.as_mut() {
                        Some(caster) => {
                            if let Err(err) = caster.update(camera) {
                                warn!(sensor = id.as_str(), %err, "shadow caster refused update");
                            }
                        }
                        None if !entry.create_failed => {
                            if let ShaderState::Ready(source) = self.shader.poll() {
                                match ShadowCaster::create(backend, camera, source) {
                                    Ok(caster) => entry.caster = Some(caster),
                                    Err(err) => {
                                        warn!(
                                            sensor = id.as_str(),
                                            %err,
                                            "shadow resources unavailable"
                                        );
                                        entry.create_failed = true;
                                    }
                                }
                            }
                        }
                        None => {}
                    }

                    if let Some(caster) = entry.caster.as_mut()
                        && let Err(err) = caster.pre_frame(&self.style, exclude_terrain)
                    {
                        warn!(sensor = id.as_str(), %err, "shadow caster pre-frame failed");
                    }
                }
                _ => {
                    if let Some(mut caster) = entry.caster.take() {
                        debug!(sensor = id.as_str(), "suspending shadow caster");
                        caster.destroy(backend);
                    }
                }
            }

            if entry.selected
                && let Some(outline) = FrustumOutline::compute(&entry.origin, &entry.view)
            {
                backend.submit_polyline(
                    &outline.polyline_points(),
                    self.style.outline_width,
                    self.style.outline_color,
                );
                backend.submit_frustum(
                    outline.apex(),
                    outline.corners(),
                    self.style.volume_color,
                );
            }
        }
    }
}
