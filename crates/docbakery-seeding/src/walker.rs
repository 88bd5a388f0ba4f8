//! Selection of the fields a `make` call has to synthesize.

use std::sync::Arc;

use crate::instance::Overrides;
use crate::schema::{FieldDescriptor, Schema};

/// Required fields of `schema` that still need a value, in declaration order.
///
/// A field is skipped when it is the identity field, when the caller
/// overrides it, or when it is optional. Optional fields are only ever
/// populated through overrides.
pub fn missing_required_fields<'s>(
	schema: &'s Schema,
	overrides: &Overrides,
) -> Vec<&'s FieldDescriptor> {
	schema
		.fields()
		.iter()
		.filter(|field| field.name() != schema.identity_field())
		.filter(|field| !overrides.contains(field.name()))
		.filter(|field| field.is_required())
		.collect()
}

/// `root` followed by every schema reachable through its nested and linked
/// fields, each listed once.
pub fn reachable_schemas(root: &Arc<Schema>) -> Vec<Arc<Schema>> {
	let mut seen = vec![Arc::clone(root)];
	let mut cursor = 0;
	while cursor < seen.len() {
		let current = Arc::clone(&seen[cursor]);
		for target in current.fields().iter().filter_map(FieldDescriptor::target) {
			let schema = target.resolve(&current);
			if !seen.iter().any(|known| Arc::ptr_eq(known, &schema)) {
				seen.push(schema);
			}
		}
		cursor += 1;
	}
	seen
}
