//! Property resolution against the query AST.
//!
//! [`PropertyQuery`] wraps the substrate [`Query`] with bookkeeping for
//! property annotations: which properties have been annotated onto the query
//! and which of those are selected. All property name resolution funnels
//! through here:
//!
//! - filters resolve property names into the property's own filter `Q`,
//!   recursively, with a stack guard so a property's default filter can
//!   reference its own annotation without recursing forever;
//! - conditions on aggregate annotations are routed to HAVING (with a GROUP
//!   BY over the model's concrete columns), everything else stays in WHERE;
//! - ordering and expression references auto-annotate properties without
//!   selecting them.
//!
//! Only selected property annotations are pushed into the query's annotation
//! list (and thereby its SELECT list); non-selected entries exist purely so
//! references to them resolve.

use std::collections::HashMap;
use std::marker::PhantomData;

use queryable_core::{QueryableError, QueryableResult};
use queryable_db::query::compiler::{OrderBy, Query, WhereNode};
use queryable_db::query::expressions::Expression;
use queryable_db::query::lookups::{Lookup, Q};

use crate::model::QueryableModel;
use crate::properties::QueryableProperty;

/// A property annotation recorded on a query.
#[derive(Debug, Clone)]
pub struct PropertyAnnotation {
    /// The property name, which is also the annotation alias.
    pub name: String,
    /// The property's annotation expression.
    pub expr: Expression,
    /// Whether the annotation is part of the SELECT list.
    pub selected: bool,
}

/// A filter condition split into its WHERE-bound and HAVING-bound parts.
///
/// Conditions on aggregate annotations must run after grouping, so a single
/// `Q` tree can produce nodes for both clauses. The two parts are implicitly
/// ANDed; combinations that cannot be split (OR across the parts) are
/// rejected during resolution.
#[derive(Debug, Default)]
pub struct FilterParts {
    /// The condition for the WHERE clause, if any.
    pub where_node: Option<WhereNode>,
    /// The condition for the HAVING clause, if any.
    pub having_node: Option<WhereNode>,
}

/// The substrate query plus queryable-property bookkeeping.
pub struct PropertyQuery<M: QueryableModel> {
    query: Query,
    property_annotations: Vec<PropertyAnnotation>,
    /// Properties whose filter is currently being expanded. A reference to
    /// the stack top resolves as an annotation reference instead of
    /// recursing into the property again.
    required_annotation_stack: Vec<String>,
    _model: PhantomData<M>,
}

impl<M: QueryableModel> PropertyQuery<M> {
    /// Creates a property-aware query over the model's table.
    pub fn new() -> Self {
        Self {
            query: Query::new(M::table_name()),
            property_annotations: Vec::new(),
            required_annotation_stack: Vec::new(),
            _model: PhantomData,
        }
    }

    /// Returns the underlying query AST.
    pub const fn query(&self) -> &Query {
        &self.query
    }

    /// Returns mutable access to the underlying query AST.
    pub fn query_mut(&mut self) -> &mut Query {
        &mut self.query
    }

    /// The property annotations recorded on this query, in insertion order.
    pub fn property_annotations(&self) -> &[PropertyAnnotation] {
        &self.property_annotations
    }

    /// Returns the recorded annotation for a property, if any.
    pub fn property_annotation(&self, name: &str) -> Option<&PropertyAnnotation> {
        self.property_annotations
            .iter()
            .find(|entry| entry.name == name)
    }

    /// The names of the selected property annotations, in insertion order.
    pub fn selected_property_names(&self) -> impl Iterator<Item = &str> {
        self.property_annotations
            .iter()
            .filter(|entry| entry.selected)
            .map(|entry| entry.name.as_str())
    }

    /// Looks up a property declared directly on `M`.
    ///
    /// Only the head of a `__`-separated path is ever resolved; properties
    /// on related models are out of scope.
    fn resolve_property(&self, name: &str) -> Option<&'static dyn QueryableProperty<M>> {
        M::queryable_properties()
            .iter()
            .find(|prop| prop.name() == name)
            .map(|prop| prop.as_ref())
    }

    /// Annotates a property onto the query if `name` refers to one.
    ///
    /// Returns whether the name was a property. Used by ordering and
    /// expression resolution, which never select.
    pub fn auto_annotate(&mut self, name: &str) -> QueryableResult<bool> {
        match self.resolve_property(name) {
            Some(prop) => {
                self.add_property_annotation(prop, false)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Records a property annotation, optionally selecting it.
    ///
    /// Re-adding an existing annotation only ORs the `selected` flag; the
    /// first flip to selected pushes the expression into the query's
    /// annotation list under the property's name. Aggregate annotations set
    /// the GROUP BY to the model's concrete columns when no grouping exists
    /// yet.
    pub fn add_property_annotation(
        &mut self,
        prop: &dyn QueryableProperty<M>,
        select: bool,
    ) -> QueryableResult<()> {
        let name = prop.name().to_string();

        if let Some(entry) = self.property_annotations.iter_mut().find(|e| e.name == name) {
            if select && !entry.selected {
                entry.selected = true;
                self.query.add_annotation(name, entry.expr.clone());
            }
            return Ok(());
        }

        let Some(expr) = prop.get_annotation() else {
            return Err(QueryableError::Property(format!(
                "Queryable property \"{name}\" needs to be added as annotation but does not \
                 implement annotation creation."
            )));
        };

        if expr.contains_aggregate() && self.query.group_by.is_empty() {
            let columns = M::meta()
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            self.query.set_group_by(columns);
        }

        if select {
            self.query.add_annotation(name.clone(), expr.clone());
        }
        self.property_annotations.push(PropertyAnnotation {
            name,
            expr,
            selected: select,
        });
        Ok(())
    }

    /// Resolves a `Q` tree into WHERE and HAVING parts.
    ///
    /// Property leaves expand into the property's own filter implementation;
    /// leaves naming an annotation compile against the annotation
    /// expression; plain field leaves become ordinary column conditions.
    pub fn add_q(&mut self, q: &Q) -> QueryableResult<FilterParts> {
        match q {
            Q::Filter { field, lookup } => self.resolve_leaf(field, lookup),
            Q::And(children) => {
                let mut where_nodes = Vec::new();
                let mut having_nodes = Vec::new();
                for child in children {
                    let parts = self.add_q(child)?;
                    if let Some(node) = parts.where_node {
                        where_nodes.push(node);
                    }
                    if let Some(node) = parts.having_node {
                        having_nodes.push(node);
                    }
                }
                Ok(FilterParts {
                    where_node: combine(where_nodes, false),
                    having_node: combine(having_nodes, false),
                })
            }
            Q::Or(children) => {
                let mut where_nodes = Vec::new();
                let mut having_nodes = Vec::new();
                for child in children {
                    let parts = self.add_q(child)?;
                    if let Some(node) = parts.where_node {
                        where_nodes.push(node);
                    }
                    if let Some(node) = parts.having_node {
                        having_nodes.push(node);
                    }
                }
                if !where_nodes.is_empty() && !having_nodes.is_empty() {
                    return Err(QueryableError::OperationalError(
                        "Filters on aggregate annotations cannot be combined with other \
                         conditions using OR."
                            .to_string(),
                    ));
                }
                Ok(FilterParts {
                    where_node: combine(where_nodes, true),
                    having_node: combine(having_nodes, true),
                })
            }
            Q::Not(inner) => {
                let parts = self.add_q(inner)?;
                match (parts.where_node, parts.having_node) {
                    (Some(node), None) => Ok(FilterParts {
                        where_node: Some(WhereNode::Not(Box::new(node))),
                        having_node: None,
                    }),
                    (None, Some(node)) => Ok(FilterParts {
                        where_node: None,
                        having_node: Some(WhereNode::Not(Box::new(node))),
                    }),
                    (Some(_), Some(_)) => Err(QueryableError::OperationalError(
                        "Filters on aggregate annotations cannot be negated together with \
                         other conditions."
                            .to_string(),
                    )),
                    (None, None) => Ok(FilterParts::default()),
                }
            }
        }
    }

    fn resolve_leaf(&mut self, field: &str, lookup: &Lookup) -> QueryableResult<FilterParts> {
        let (head, rest) = match field.split_once("__") {
            Some((head, rest)) => (head, Some(rest)),
            None => (field, None),
        };

        let guarded = self
            .required_annotation_stack
            .last()
            .is_some_and(|top| top == head);

        if !guarded {
            if let Some(prop) = self.resolve_property(head) {
                if let Some(rest) = rest {
                    return Err(QueryableError::Property(format!(
                        "Unsupported path '{rest}' for queryable property \"{head}\"."
                    )));
                }
                let Some(filter_result) = prop.get_filter(lookup) else {
                    return Err(QueryableError::Property(format!(
                        "Queryable property \"{head}\" is supposed to be used as a filter but \
                         does not implement filtering."
                    )));
                };
                let filter_q = filter_result?;
                if prop.filter_requires_annotation() {
                    self.add_property_annotation(prop, false)?;
                }
                self.required_annotation_stack.push(head.to_string());
                let parts = self.add_q(&filter_q);
                self.required_annotation_stack.pop();
                return parts;
            }
        }

        // Annotation references: property annotations recorded on this query
        // and manual annotations added through annotate().
        if rest.is_none() {
            let annotation_expr = self
                .property_annotation(head)
                .map(|entry| entry.expr.clone())
                .or_else(|| self.query.annotation(head).cloned());
            if let Some(expr) = annotation_expr {
                let aggregate = expr.contains_aggregate();
                let node = WhereNode::ExpressionCondition {
                    expr,
                    lookup: lookup.clone(),
                };
                return Ok(if aggregate {
                    FilterParts {
                        where_node: None,
                        having_node: Some(node),
                    }
                } else {
                    FilterParts {
                        where_node: Some(node),
                        having_node: None,
                    }
                });
            }
        }

        // Plain model fields. "pk" aliases the primary key field.
        let column = if head == "pk" {
            Some(M::pk_field_name().to_string())
        } else {
            M::meta()
                .fields
                .iter()
                .find(|f| f.name == head || f.column == head)
                .map(|f| f.column.clone())
        };
        if let Some(column) = column {
            if rest.is_some() {
                return Err(unknown_field_error::<M>(field));
            }
            return Ok(FilterParts {
                where_node: Some(WhereNode::Condition {
                    column,
                    lookup: lookup.clone(),
                }),
                having_node: None,
            });
        }

        Err(unknown_field_error::<M>(head))
    }

    /// Substitutes property references inside an expression.
    ///
    /// `F(name)` nodes naming a property inline the property's annotation
    /// expression (auto-annotating it, non-selected); names of existing
    /// annotations inline those. Plain field references pass through.
    pub fn resolve_expression(&mut self, expr: Expression) -> QueryableResult<Expression> {
        let referenced: Vec<String> = expr
            .referenced_fields()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut map = HashMap::new();
        for name in referenced {
            if let Some(entry) = self.property_annotation(&name) {
                map.insert(name, entry.expr.clone());
                continue;
            }
            if let Some(manual) = self.query.annotation(&name) {
                let resolved = manual.clone();
                map.insert(name, resolved);
                continue;
            }
            if let Some(prop) = self.resolve_property(&name) {
                self.add_property_annotation(prop, false)?;
                if let Some(entry) = self.property_annotation(&name) {
                    map.insert(name, entry.expr.clone());
                }
            }
        }
        Ok(expr.replace_field_refs(&map))
    }

    /// Resolves an ordering spec (a name with an optional `-` prefix).
    ///
    /// Property names annotate the property without selecting it; ordering
    /// uses the alias when the property is selected and the inlined
    /// expression otherwise.
    pub fn resolve_order_field(&mut self, spec: &str) -> QueryableResult<OrderBy> {
        let (descending, name) = match spec.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, spec),
        };

        if let Some(prop) = self.resolve_property(name) {
            self.add_property_annotation(prop, false)?;
            if let Some(entry) = self.property_annotation(name) {
                return Ok(if entry.selected {
                    order_column(name, descending)
                } else {
                    let expr = entry.expr.clone();
                    if descending {
                        OrderBy::desc_expr(expr)
                    } else {
                        OrderBy::asc_expr(expr)
                    }
                });
            }
        }

        if self.query.annotation(name).is_some() {
            return Ok(order_column(name, descending));
        }

        if name == "pk" {
            return Ok(order_column(M::pk_field_name(), descending));
        }

        if let Some(field) = M::meta()
            .fields
            .iter()
            .find(|f| f.name == name || f.column == name)
        {
            return Ok(order_column(field.column.clone(), descending));
        }

        Err(unknown_field_error::<M>(name))
    }
}

impl<M: QueryableModel> Default for PropertyQuery<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: QueryableModel> Clone for PropertyQuery<M> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            property_annotations: self.property_annotations.clone(),
            required_annotation_stack: self.required_annotation_stack.clone(),
            _model: PhantomData,
        }
    }
}

impl<M: QueryableModel> std::fmt::Debug for PropertyQuery<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyQuery")
            .field("query", &self.query)
            .field("property_annotations", &self.property_annotations)
            .field("required_annotation_stack", &self.required_annotation_stack)
            .finish()
    }
}

/// Builds the unresolvable-name error, listing fields and properties.
pub(crate) fn unknown_field_error<M: QueryableModel>(name: &str) -> QueryableError {
    let mut choices: Vec<&str> = M::meta().fields.iter().map(|f| f.name).collect();
    choices.extend(M::queryable_properties().iter().map(|prop| prop.name()));
    choices.sort_unstable();
    QueryableError::FieldError(format!(
        "Cannot resolve keyword '{name}' into field. Choices are: {}",
        choices.join(", ")
    ))
}

fn order_column(column: impl Into<String>, descending: bool) -> OrderBy {
    if descending {
        OrderBy::desc(column)
    } else {
        OrderBy::asc(column)
    }
}

fn combine(mut nodes: Vec<WhereNode>, or: bool) -> Option<WhereNode> {
    match nodes.len() {
        0 => None,
        1 => Some(nodes.remove(0)),
        _ => Some(if or {
            WhereNode::Or(nodes)
        } else {
            WhereNode::And(nodes)
        }),
    }
}
