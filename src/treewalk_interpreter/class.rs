use super::environment::Environment;
use super::object::Object;

use std::fmt;

/// A class value: the frame its `let` members were bound in. Evaluating the
/// literal creates the frame once; every copy of the value shares it.
#[derive(Clone)]
pub struct CornyClass {
    members: Environment,
}

impl CornyClass {
    pub fn new(members: Environment) -> Self {
        CornyClass { members }
    }

    pub fn env(&self) -> &Environment {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<Object> {
        self.members.get_local(name)
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.contains_local(name)
    }
}

impl fmt::Debug for CornyClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<class {}>", self.members.local_names().join(", "))
    }
}

impl PartialEq<CornyClass> for CornyClass {
    fn eq(&self, other: &Self) -> bool {
        self.members.ptr_eq(&other.members)
    }
}

impl Eq for CornyClass {}
