//! The circuit arena: nodes, components, and the build/lock lifecycle.

use crate::components::{Capacitor, Comparator, LinearAmp, Resistor};
use crate::error::{CircuitError, Result};
use crate::solver::{PerformanceStats, SolverConfig};

use super::node::Node;
use super::types::{CapacitorId, ComparatorId, LinearAmpId, NodeId, ResistorId};

/// An analog circuit, with a two-phase lifecycle.
///
/// Before [`lock()`](Circuit::lock) only builder methods are allowed: create
/// nodes, add components. After `lock()` the collections never resize, so
/// references returned by the component accessors stay valid for the
/// circuit's lifetime, and only solve and read methods are allowed.
///
/// Insertion order is significant: the evaluator processes components in the
/// order they were added, and the builder rejects active device topologies
/// that would require an out-of-order update within one pass.
#[derive(Debug, Default)]
pub struct Circuit {
    is_locked: bool,
    pub(crate) nodes: Vec<Node>,
    pub(crate) resistors: Vec<Resistor>,
    pub(crate) capacitors: Vec<Capacitor>,
    pub(crate) linear_amps: Vec<LinearAmp>,
    pub(crate) comparators: Vec<Comparator>,
    pub(crate) total_adjust_node_voltages_count: u64,
    pub(crate) total_current_updates: u64,
    pub(crate) total_samples: u64,
    pub(crate) simulation_time: f64,
    /// Solver tunables; settable before or after lock.
    pub config: SolverConfig,
}

impl Circuit {
    /// Create an empty, unlocked circuit with default solver tunables.
    pub fn new() -> Self {
        Self::default()
    }

    fn confirm_unlocked(&self, operation: &str) -> Result<()> {
        if self.is_locked {
            Err(CircuitError::locked(operation))
        } else {
            Ok(())
        }
    }

    fn confirm_locked(&self, operation: &str) -> Result<()> {
        if self.is_locked {
            Ok(())
        } else {
            Err(CircuitError::unlocked(operation))
        }
    }

    fn check_node(&self, node: NodeId) -> Result<()> {
        if node.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(CircuitError::NodeIndexOutOfRange {
                index: node.0,
                count: self.nodes.len(),
            })
        }
    }

    // ============ Builder phase ============

    /// Append a fresh unforced, non-sinking node.
    pub fn create_node(&mut self) -> Result<NodeId> {
        self.confirm_unlocked("create_node")?;
        let index = self.nodes.len();
        self.nodes.push(Node::default());
        Ok(NodeId(index))
    }

    /// Mark an existing node as a forced-voltage current sink, e.g. a fixed
    /// source whose voltage is written from outside.
    pub fn allocate_forced_voltage_node(&mut self, node: NodeId) -> Result<()> {
        self.confirm_unlocked("allocate_forced_voltage_node")?;
        self.check_node(node)?;
        let n = &mut self.nodes[node.0];
        if n.forced_voltage {
            return Err(CircuitError::conflict(node, "voltage was already forced"));
        }
        if n.current_sink {
            return Err(CircuitError::conflict(node, "already a current sink"));
        }
        n.forced_voltage = true;
        n.current_sink = true;
        Ok(())
    }

    /// Mark an existing node as an unforced current sink: a linear amp
    /// output, whose voltage is an unknown but whose current is absorbed.
    fn allocate_unforced_current_sink_node(&mut self, node: NodeId) -> Result<()> {
        self.check_node(node)?;
        let n = &mut self.nodes[node.0];
        if n.forced_voltage {
            return Err(CircuitError::conflict(node, "voltage was already forced"));
        }
        if n.current_sink {
            return Err(CircuitError::conflict(node, "already a current sink"));
        }
        n.current_sink = true;
        Ok(())
    }

    /// Mark an existing node as a virtual ground: voltage pinned to zero,
    /// but not a sink, because an ideal op-amp input draws no current.
    fn allocate_virtual_ground_node(&mut self, node: NodeId) -> Result<()> {
        self.check_node(node)?;
        let n = &mut self.nodes[node.0];
        if n.forced_voltage {
            return Err(CircuitError::conflict(node, "voltage was already forced"));
        }
        if n.current_sink {
            return Err(CircuitError::conflict(node, "already a current sink"));
        }
        n.forced_voltage = true;
        n.voltage[0] = 0.0;
        n.voltage[1] = 0.0;
        Ok(())
    }

    /// Create a forced-voltage node with all history slots set to `voltage`.
    pub fn create_forced_voltage_node(&mut self, voltage: f64) -> Result<NodeId> {
        let node = self.create_node()?;
        self.allocate_forced_voltage_node(node)?;
        self.nodes[node.0].voltage.fill(voltage);
        Ok(node)
    }

    /// Create a forced-voltage node at 0 V.
    pub fn create_ground_node(&mut self) -> Result<NodeId> {
        self.create_forced_voltage_node(0.0)
    }

    /// Add a resistor of `resistance` ohms between nodes `a` and `b`.
    pub fn add_resistor(&mut self, resistance: f64, a: NodeId, b: NodeId) -> Result<ResistorId> {
        self.confirm_unlocked("add_resistor")?;
        self.check_node(a)?;
        self.check_node(b)?;
        self.resistors.push(Resistor::new(resistance, a, b));
        Ok(ResistorId(self.resistors.len() - 1))
    }

    /// Add a capacitor of `capacitance` farads between nodes `a` and `b`.
    pub fn add_capacitor(&mut self, capacitance: f64, a: NodeId, b: NodeId) -> Result<CapacitorId> {
        self.confirm_unlocked("add_capacitor")?;
        self.check_node(a)?;
        self.check_node(b)?;
        self.capacitors.push(Capacitor::new(capacitance, a, b));
        Ok(CapacitorId(self.capacitors.len() - 1))
    }

    /// Add an ideal op-amp with a grounded positive input.
    ///
    /// The negative input becomes a virtual ground and the output becomes an
    /// unforced current sink whose voltage the solver determines. Amplifier
    /// outputs are evaluated in insertion order, so an amp may not feed an
    /// earlier active device's input, and all linear amps must be added
    /// before any comparator.
    pub fn add_linear_amp(&mut self, neg: NodeId, out: NodeId) -> Result<LinearAmpId> {
        self.confirm_unlocked("add_linear_amp")?;
        self.check_node(neg)?;
        self.check_node(out)?;

        if self.nodes[out.0].is_active_device_input {
            return Err(CircuitError::ordering(
                "linear amplifier output may not connect directly to an earlier active device's input",
            ));
        }
        if !self.comparators.is_empty() {
            return Err(CircuitError::ordering(
                "cannot add a linear amplifier after any comparators",
            ));
        }

        self.allocate_unforced_current_sink_node(out)?;
        self.allocate_virtual_ground_node(neg)?;
        self.nodes[neg.0].is_active_device_input = true;

        self.linear_amps.push(LinearAmp::new(neg, out));
        Ok(LinearAmpId(self.linear_amps.len() - 1))
    }

    /// Add an op-amp configured for saturation, with a grounded positive
    /// input. The output voltage is forced to one of the two saturation
    /// rails, latched from the previous sample's negative input.
    pub fn add_comparator(&mut self, neg: NodeId, out: NodeId) -> Result<ComparatorId> {
        self.confirm_unlocked("add_comparator")?;
        self.check_node(neg)?;
        self.check_node(out)?;

        if self.nodes[out.0].is_active_device_input {
            return Err(CircuitError::ordering(
                "comparator output may not connect directly to an earlier active device's input",
            ));
        }

        self.allocate_forced_voltage_node(out)?;
        self.nodes[neg.0].is_active_device_input = true;

        self.comparators.push(Comparator::new(neg, out));
        Ok(ComparatorId(self.comparators.len() - 1))
    }

    /// Flip the one-way lock latch.
    ///
    /// Locking prevents any further topology changes, which makes it safe to
    /// hand out references to components: the collections can never resize
    /// and leave a caller's reference dangling.
    pub fn lock(&mut self) {
        self.is_locked = true;
    }

    /// Whether the circuit has been locked.
    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    /// Reset all dynamic state (voltages, currents, counters) without
    /// disturbing the topology. Forced nodes keep their assigned voltages.
    pub fn initialize(&mut self) {
        self.total_adjust_node_voltages_count = 0;
        self.total_current_updates = 0;
        self.total_samples = 0;
        self.simulation_time = 0.0;

        for r in &mut self.resistors {
            r.initialize();
        }
        for c in &mut self.capacitors {
            c.initialize();
        }
        for n in &mut self.nodes {
            n.initialize();
        }
    }

    // ============ Accessors ============

    /// Number of nodes, including forced and ground nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of resistors.
    pub fn resistor_count(&self) -> usize {
        self.resistors.len()
    }

    /// Number of capacitors.
    pub fn capacitor_count(&self) -> usize {
        self.capacitors.len()
    }

    /// Number of linear amplifiers.
    pub fn linear_amp_count(&self) -> usize {
        self.linear_amps.len()
    }

    /// Number of comparators.
    pub fn comparator_count(&self) -> usize {
        self.comparators.len()
    }

    /// Borrow a node. Requires the locked state.
    pub fn node(&self, node: NodeId) -> Result<&Node> {
        self.confirm_locked("node")?;
        self.check_node(node)?;
        Ok(&self.nodes[node.0])
    }

    /// Read a node's current-sample voltage.
    ///
    /// # Panics
    /// Panics if `node` is out of range, like slice indexing.
    pub fn node_voltage(&self, node: NodeId) -> f64 {
        self.nodes[node.0].voltage[0]
    }

    /// Borrow a node's current-sample voltage mutably.
    ///
    /// This is the supported channel for injecting input signals: write the
    /// voltage of a forced node between calls to `update`. Requires the
    /// locked state.
    pub fn node_voltage_mut(&mut self, node: NodeId) -> Result<&mut f64> {
        self.confirm_locked("node_voltage_mut")?;
        self.check_node(node)?;
        Ok(&mut self.nodes[node.0].voltage[0])
    }

    /// Borrow a resistor. Requires the locked state.
    pub fn resistor(&self, id: ResistorId) -> Result<&Resistor> {
        self.confirm_locked("resistor")?;
        self.component(&self.resistors, "resistor", id.0)
    }

    /// Borrow a resistor mutably, e.g. to turn a variable resistance.
    /// Requires the locked state.
    pub fn resistor_mut(&mut self, id: ResistorId) -> Result<&mut Resistor> {
        self.confirm_locked("resistor_mut")?;
        let count = self.resistors.len();
        self.resistors
            .get_mut(id.0)
            .ok_or(CircuitError::ComponentIndexOutOfRange {
                kind: "resistor",
                index: id.0,
                count,
            })
    }

    /// Borrow a capacitor. Requires the locked state.
    pub fn capacitor(&self, id: CapacitorId) -> Result<&Capacitor> {
        self.confirm_locked("capacitor")?;
        self.component(&self.capacitors, "capacitor", id.0)
    }

    /// Borrow a linear amplifier. Requires the locked state.
    pub fn linear_amp(&self, id: LinearAmpId) -> Result<&LinearAmp> {
        self.confirm_locked("linear_amp")?;
        self.component(&self.linear_amps, "linear amp", id.0)
    }

    /// Borrow a comparator. Requires the locked state.
    pub fn comparator(&self, id: ComparatorId) -> Result<&Comparator> {
        self.confirm_locked("comparator")?;
        self.component(&self.comparators, "comparator", id.0)
    }

    fn component<'a, T>(&self, list: &'a [T], kind: &'static str, index: usize) -> Result<&'a T> {
        list.get(index).ok_or(CircuitError::ComponentIndexOutOfRange {
            kind,
            index,
            count: list.len(),
        })
    }

    /// Snapshot of the cumulative performance counters.
    pub fn performance_stats(&self) -> PerformanceStats {
        PerformanceStats {
            total_adjust_node_voltages_count: self.total_adjust_node_voltages_count,
            total_current_updates: self.total_current_updates,
            total_samples: self.total_samples,
            simulation_time_seconds: self.simulation_time,
        }
    }
}
