//! The serialization collaborator interface (`spec.md` §6): an opaque
//! message the core reads and writes through, never a wire format of its
//! own. Field layout matches the four message shapes named there.

use crate::domain::IntCst;

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct IntVarAssignment {
    pub name: String,
    pub min: IntCst,
    pub max: IntCst,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct IntervalVarAssignment {
    pub name: String,
    pub start_min: IntCst,
    pub start_max: IntCst,
    pub duration_min: IntCst,
    pub duration_max: IntCst,
    pub end_min: IntCst,
    pub end_max: IntCst,
    pub performed_min: IntCst,
    pub performed_max: IntCst,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ObjectiveAssignment {
    pub name: String,
    pub min: IntCst,
    pub max: IntCst,
    pub active: bool,
}

/// The collaborator an `Assignment` saves to and loads from. The exact wire
/// encoding (protobuf, JSON, whatever) is entirely up to the implementation;
/// the core only requires round-trip identity on the fields above
/// (`spec.md` §6).
pub trait AssignmentProto {
    fn model_name(&self) -> &str;
    fn set_model_name(&mut self, name: &str);

    fn int_vars(&self) -> &[IntVarAssignment];
    fn push_int_var(&mut self, rec: IntVarAssignment);

    fn interval_vars(&self) -> &[IntervalVarAssignment];
    fn push_interval_var(&mut self, rec: IntervalVarAssignment);

    fn objective(&self) -> Option<&ObjectiveAssignment>;
    fn set_objective(&mut self, rec: Option<ObjectiveAssignment>);

    fn clear(&mut self);
}

/// A plain in-memory `AssignmentProto`, the default used by tests and by
/// callers with no external wire format (`spec.md` §4.5 "load/save are
/// delegated to the serialization collaborator").
#[derive(Clone, Debug, Default)]
pub struct InMemoryProto {
    model_name: String,
    int_vars: Vec<IntVarAssignment>,
    interval_vars: Vec<IntervalVarAssignment>,
    objective: Option<ObjectiveAssignment>,
}

impl InMemoryProto {
    pub fn new(model_name: impl Into<String>) -> Self {
        InMemoryProto { model_name: model_name.into(), ..Default::default() }
    }
}

impl AssignmentProto for InMemoryProto {
    fn model_name(&self) -> &str {
        &self.model_name
    }
    fn set_model_name(&mut self, name: &str) {
        self.model_name = name.to_string();
    }

    fn int_vars(&self) -> &[IntVarAssignment] {
        &self.int_vars
    }
    fn push_int_var(&mut self, rec: IntVarAssignment) {
        self.int_vars.push(rec);
    }

    fn interval_vars(&self) -> &[IntervalVarAssignment] {
        &self.interval_vars
    }
    fn push_interval_var(&mut self, rec: IntervalVarAssignment) {
        self.interval_vars.push(rec);
    }

    fn objective(&self) -> Option<&ObjectiveAssignment> {
        self.objective.as_ref()
    }
    fn set_objective(&mut self, rec: Option<ObjectiveAssignment>) {
        self.objective = rec;
    }

    fn clear(&mut self) {
        self.int_vars.clear();
        self.interval_vars.clear();
        self.objective = None;
    }
}
