//! Browser binding for the detection engine
//!
//! Positions crossing this boundary are UTF-8 byte offsets, the same as the
//! Rust API. Styles are plain JSON values.
//!
//! # Usage (JavaScript)
//! ```javascript,ignore
//! import init, { SprigEngine } from 'sprig';
//!
//! await init();
//! const engine = new SprigEngine({
//!   detectors: [{ tag: 'important', pattern: '\\w*!', animates: true, style: { color: '#ff7f00' } }]
//! });
//! const delta = engine.applyEdit(0, 0, 'This is great!');
//! console.log(delta.added);                        // [{ start: 8, len: 6 }]
//! console.log(engine.animatableRanges(0, engine.length()));
//! ```

use js_sys::Function;
use serde::Serialize;
use serde_json::Value;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

use crate::config::{DetectorSpec, EngineConfig};
use crate::error::ScanError;
use crate::scanner::detector::{Detector, SharedDetector};
use crate::scanner::incremental::{Delta, IncrementalDetectionEngine};
use crate::scanner::intern::MatchTag;
use crate::scanner::span::Span;

fn js_error(e: ScanError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Plain objects rather than `Map`s, so styles read back as JSON
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Delta as span lists, the shape the presentation layer consumes
#[derive(Serialize)]
struct DeltaView {
    added: Vec<Span>,
    removed: Vec<Span>,
}

impl From<&Delta> for DeltaView {
    fn from(delta: &Delta) -> Self {
        Self {
            added: delta.added_spans(),
            removed: delta.removed_spans(),
        }
    }
}

// =============================================================================
// JsDetector
// =============================================================================

/// Detector backed by a JS callback `(fragment) => [{ start, len }, ...]`
struct JsDetector {
    tag: MatchTag,
    animates: bool,
    style: Value,
    callback: Function,
}

impl Detector<Value> for JsDetector {
    fn tag(&self) -> MatchTag {
        self.tag
    }

    fn animates(&self) -> bool {
        self.animates
    }

    fn style(&self) -> Value {
        self.style.clone()
    }

    fn detect(&self, fragment: &str) -> Vec<Span> {
        let returned = match self.callback.call1(&JsValue::NULL, &JsValue::from_str(fragment)) {
            Ok(value) => value,
            // A throwing detector is a configuration error, not a miss
            Err(err) => wasm_bindgen::throw_val(err),
        };
        serde_wasm_bindgen::from_value(returned).unwrap_or_else(|e| {
            web_sys::console::warn_1(&format!(
                "[SprigEngine] Detector `{}` returned malformed spans: {}",
                self.tag, e
            ).into());
            Vec::new()
        })
    }
}

// =============================================================================
// SprigEngine
// =============================================================================

#[wasm_bindgen]
pub struct SprigEngine {
    inner: IncrementalDetectionEngine<Value>,
}

impl SprigEngine {
    fn from_config(config: &EngineConfig) -> Result<SprigEngine, JsValue> {
        let inner = config.build_engine().map_err(js_error)?;

        web_sys::console::log_1(&format!(
            "[SprigEngine] Ready ({} detectors, {:?} granularity)",
            inner.detectors().len(),
            inner.granularity()
        ).into());

        Ok(SprigEngine { inner })
    }

    fn commit(&mut self, detectors: Vec<SharedDetector<Value>>) -> Result<JsValue, JsValue> {
        let delta = self.inner.set_detectors(detectors).map_err(js_error)?;
        web_sys::console::log_1(&format!(
            "[SprigEngine] Detectors set ({})",
            self.inner.detectors().len()
        ).into());
        to_js(&DeltaView::from(&delta))
    }
}

#[wasm_bindgen]
impl SprigEngine {
    /// Create an engine from an `EngineConfig` object (or nothing for defaults)
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<SprigEngine, JsValue> {
        let config: EngineConfig = if config.is_undefined() || config.is_null() {
            EngineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?
        };
        Self::from_config(&config)
    }

    /// Engine with the exclamation and question detectors
    #[wasm_bindgen]
    pub fn demo() -> Result<SprigEngine, JsValue> {
        Self::from_config(&EngineConfig::demo())
    }

    /// Replace all detectors with regex specs. Returns the coverage delta.
    #[wasm_bindgen(js_name = setDetectors)]
    pub fn set_detectors(&mut self, specs: JsValue) -> Result<JsValue, JsValue> {
        let specs: Vec<DetectorSpec> = serde_wasm_bindgen::from_value(specs)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse detectors: {}", e)))?;
        let config = EngineConfig {
            detectors: specs,
            ..EngineConfig::default()
        };
        let detectors = config.build_detectors().map_err(js_error)?;
        self.commit(detectors)
    }

    /// Append a callback detector at lowest priority
    #[wasm_bindgen(js_name = addJsDetector)]
    pub fn add_js_detector(
        &mut self,
        tag: &str,
        animates: bool,
        style: JsValue,
        callback: Function,
    ) -> Result<JsValue, JsValue> {
        let style: Value = if style.is_undefined() {
            Value::Null
        } else {
            serde_wasm_bindgen::from_value(style)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse style: {}", e)))?
        };

        let mut detectors = self.inner.detectors().to_vec();
        detectors.push(Rc::new(JsDetector {
            tag: MatchTag::new(tag),
            animates,
            style,
            callback,
        }));
        self.commit(detectors)
    }

    /// Replace `length` bytes at `start` with `text`. Returns `{ added, removed }` spans.
    #[wasm_bindgen(js_name = applyEdit)]
    pub fn apply_edit(&mut self, start: usize, length: usize, text: &str) -> Result<JsValue, JsValue> {
        let delta = self
            .inner
            .apply_edit(Span::new(start, length), text)
            .map_err(js_error)?;
        to_js(&DeltaView::from(&delta))
    }

    #[wasm_bindgen(js_name = rangesOf)]
    pub fn ranges_of(&self, tag: &str, start: usize, length: usize) -> Result<JsValue, JsValue> {
        let ranges = self
            .inner
            .ranges_of(MatchTag::new(tag), Span::new(start, length))
            .map_err(js_error)?;
        to_js(&ranges)
    }

    #[wasm_bindgen(js_name = animatableRanges)]
    pub fn animatable_ranges(&self, start: usize, length: usize) -> Result<JsValue, JsValue> {
        let ranges = self
            .inner
            .animatable_ranges(Span::new(start, length))
            .map_err(js_error)?;
        to_js(&ranges)
    }

    #[wasm_bindgen(js_name = staticRanges)]
    pub fn static_ranges(&self, start: usize, length: usize) -> Result<JsValue, JsValue> {
        let ranges = self
            .inner
            .static_ranges(Span::new(start, length))
            .map_err(js_error)?;
        to_js(&ranges)
    }

    /// Style of the match covering `position`, or undefined
    #[wasm_bindgen(js_name = styleAt)]
    pub fn style_at(&self, position: usize) -> Result<JsValue, JsValue> {
        match self.inner.style_at(position) {
            Some(style) => to_js(style),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    #[wasm_bindgen]
    pub fn text(&self) -> String {
        self.inner.text().to_string()
    }

    #[wasm_bindgen]
    pub fn length(&self) -> usize {
        self.inner.len()
    }

    #[wasm_bindgen]
    pub fn refresh(&mut self) -> Result<JsValue, JsValue> {
        let delta = self.inner.refresh().map_err(js_error)?;
        to_js(&DeltaView::from(&delta))
    }

    #[wasm_bindgen]
    pub fn stats(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.stats())
    }

    #[wasm_bindgen(js_name = stateName)]
    pub fn state_name(&self) -> String {
        self.inner.state_name().to_string()
    }
}
