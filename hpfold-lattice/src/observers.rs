use std::cell::RefCell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::rc::Rc;

use hpfold_sim::{Energy, Observer};
use log::info;
use plotters::prelude::*;

use crate::chain::{Chain, HPClass};
use crate::energy::ContactEnergy;

/// Renders `chain` as a PNG: a line through the backbone in sequence
/// order, H residues as filled circles, P residues as open ones.
pub fn render_conformation(chain: &Chain, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let positions: Vec<(i32, i32)> = (0..chain.length()).map(|i| {
        let p = chain.position(i);
        (p.x, p.y)
    }).collect();

    let (min_x, max_x) = positions.iter().map(|(x, _)| *x).fold((i32::MAX, i32::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let (min_y, max_y) = positions.iter().map(|(_, y)| *y).fold((i32::MAX, i32::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let margin = 1;

    let root = BitMapBackend::new(path, (640, 640)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .build_cartesian_2d((min_x - margin)..(max_x + margin + 1), (min_y - margin)..(max_y + margin + 1))?;
    chart.configure_mesh().disable_mesh().draw()?;

    chart.draw_series(LineSeries::new(positions.iter().copied(), &BLACK))?;

    for i in 0..chain.length() {
        let (x, y) = positions[i];
        let style = match chain.class_at(i) {
            HPClass::H => ShapeStyle { color: RED.into(), filled: true, stroke_width: 2 },
            HPClass::P => ShapeStyle { color: BLUE.into(), filled: false, stroke_width: 2 },
        };
        chart.draw_series(std::iter::once(Circle::new((x, y), 8, style)))?;
    }

    root.present()?;
    Ok(())
}

/// Records the whole-chain contact energy after every observed step, both
/// in memory and as a tab-separated trace file.
pub struct EnergyTraceObserver {
    energy: ContactEnergy,
    writer: BufWriter<File>,
    step: usize,
    trace: Vec<f64>,
}

impl EnergyTraceObserver {
    pub fn new(fname: &str) -> std::io::Result<Self> {
        let mut writer = hpfold_io::out_writer(fname)?;
        writeln!(writer, "step\tenergy")?;
        Ok(EnergyTraceObserver { energy: ContactEnergy, writer, step: 0, trace: Vec::new() })
    }

    pub fn trace(&self) -> &[f64] {
        &self.trace
    }
}

impl Observer<Chain> for EnergyTraceObserver {
    fn observe(&mut self, chain: &Chain) {
        let e = self.energy.energy(chain);
        self.trace.push(e);
        if let Err(err) = writeln!(self.writer, "{}\t{e}", self.step) {
            log::warn!("failed writing energy trace: {err}");
        }
        self.step += 1;
    }

    fn finalize(&mut self) {
        let _ = self.writer.flush();
    }

    fn name(&self) -> String {
        String::from("EnergyTraceObserver")
    }
}

/// Saves up to `max_frames` conformation snapshots (cloned [`Chain`]s,
/// spaced evenly across however many observations actually occur) so the
/// caller can render `Frame_1.png` .. `Frame_N.png` after the run.
pub struct SampleFrameObserver {
    max_frames: usize,
    frames: Vec<Chain>,
    seen: usize,
}

impl SampleFrameObserver {
    pub fn new(max_frames: usize) -> Self {
        SampleFrameObserver { max_frames, frames: Vec::new(), seen: 0 }
    }

    pub fn frames(&self) -> &[Chain] {
        &self.frames
    }
}

impl Observer<Chain> for SampleFrameObserver {
    fn observe(&mut self, chain: &Chain) {
        self.seen += 1;
        if self.frames.len() < self.max_frames {
            self.frames.push(chain.clone());
        }
    }

    fn finalize(&mut self) {
        info!("sampled {} of {} accepted steps seen", self.frames.len(), self.seen);
    }

    fn name(&self) -> String {
        String::from("SampleFrameObserver")
    }
}

/// Wraps an [`Observer`] in `Rc<RefCell<_>>` so a caller can keep a handle to
/// it (via [`SharedObserver::handle`]) after boxing the wrapper into an
/// [`hpfold_sim::ObserversSet`], and read back whatever state the observer
/// accumulated once the run is over - `ObserversSet` only ever hands back
/// `&mut dyn Observer`, never the concrete type it was built from.
pub struct SharedObserver<O> {
    inner: Rc<RefCell<O>>,
}

impl<O> SharedObserver<O> {
    pub fn new(observer: O) -> Self {
        SharedObserver { inner: Rc::new(RefCell::new(observer)) }
    }

    pub fn handle(&self) -> Rc<RefCell<O>> {
        Rc::clone(&self.inner)
    }
}

impl<S: hpfold_sim::System, O: Observer<S>> Observer<S> for SharedObserver<O> {
    fn observe(&mut self, system: &S) {
        self.inner.borrow_mut().observe(system);
    }

    fn finalize(&mut self) {
        self.inner.borrow_mut().finalize();
    }

    fn name(&self) -> String {
        self.inner.borrow().name()
    }
}
