// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Statement Compiler
//!
//! Compiles a [`QuerySpec`] into literal SQL text and an ordered parameter
//! list. The terminal kind of the first branch selects the statement shape:
//!
//! | kind   | single branch | union chain |
//! |--------|---------------|-------------|
//! | select | `SELECT ...` (CTE-paged with skip/take) | `(b1) UNION (b2) ...` |
//! | count  | `SELECT COUNT(<key>) ...` | `SELECT COUNT(*) FROM (... UNION ...) AS [Counted]` |
//! | exists | `IF EXISTS (SELECT 1 ...) SELECT 1 ELSE SELECT 0` | same, branches joined by `UNION` |
//! | delete | `DELETE <root> FROM ...` | first branch only |
//!
//! ## Parameter numbering
//!
//! Predicates bind parameters in declaration order starting at `@0`. Union
//! branches continue from the previous branch. A paged select renders its
//! predicates once and reuses the text in both stages, so the CTE and the
//! outer select reference identical indices; the offset and fetch values take
//! the two indices after the predicates.

use std::sync::Arc;

use serde::Serialize;
use setql_catalog::Catalog;
use setql_ir::{Condition, Literal, OrderBy, Paging, Predicate, QuerySpec, StatementKind};
use tracing::{debug, instrument, warn};

use crate::config::CompilerOptions;
use crate::error::{CompileResult, SpecificationError};
use crate::params::ParameterList;
use crate::resolve::JoinGraph;

/// SQL text with its positional parameter values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledStatement {
    pub sql: String,
    /// Values for `@0`, `@1`, ... in index order
    pub parameters: Vec<Literal>,
}

/// Compiles query specifications against a catalog
#[derive(Clone)]
pub struct StatementCompiler {
    catalog: Arc<dyn Catalog>,
    options: CompilerOptions,
}

impl StatementCompiler {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self {
            catalog,
            options: CompilerOptions::default(),
        }
    }

    /// Builder method: replace the rendering options
    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile `spec` according to its terminal kind
    ///
    /// # Errors
    ///
    /// `CompileError::Metadata` when an entity is unknown or a key is
    /// required but missing; `CompileError::Specification` when the
    /// specification cannot be satisfied by the metadata.
    #[instrument(skip(self, spec), fields(entity = %spec.entity, kind = ?spec.kind))]
    pub fn compile(&self, spec: &QuerySpec) -> CompileResult<CompiledStatement> {
        let branches = spec.branches();
        let mut params = ParameterList::new(self.options.dialect);

        let sql = match spec.kind {
            StatementKind::Select => self.select(&branches, &mut params)?,
            StatementKind::Count => self.count(&branches, &mut params)?,
            StatementKind::Exists => self.exists(&branches, &mut params)?,
            StatementKind::Delete => self.delete(&branches, &mut params)?,
        };

        debug!(
            branches = branches.len(),
            parameters = params.len(),
            "Compiled statement"
        );
        Ok(CompiledStatement {
            sql,
            parameters: params.into_values(),
        })
    }

    fn select(&self, branches: &[&QuerySpec], params: &mut ParameterList) -> CompileResult<String> {
        if let [spec] = branches {
            return match spec.paging {
                Some(paging) => self.paged_select(spec, paging, params),
                None => self.plain_select(spec, params),
            };
        }

        if branches.iter().any(|branch| branch.paging.is_some()) {
            return Err(SpecificationError::PagingInUnion.into());
        }
        let parts = branches
            .iter()
            .map(|branch| {
                self.plain_select(branch, params)
                    .map(|sql| format!("({})", sql))
            })
            .collect::<CompileResult<Vec<_>>>()?;
        Ok(parts.join(" UNION "))
    }

    fn plain_select(&self, spec: &QuerySpec, params: &mut ParameterList) -> CompileResult<String> {
        let graph = self.graph(spec)?;
        let projection = graph.projection(&spec.columns)?;
        let predicates = render_predicates(&graph, &spec.predicates, params)?;
        let order = render_order(&graph, &spec.order_by)?;

        let mut sql = format!("SELECT {} {}", projection.join(", "), graph.from_clause());
        push_where(&mut sql, &predicates);
        if !order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }
        Ok(sql)
    }

    /// Two-stage select: a CTE isolates the keys of the requested page, the
    /// outer select re-joins the full row set for those keys
    fn paged_select(
        &self,
        spec: &QuerySpec,
        paging: Paging,
        params: &mut ParameterList,
    ) -> CompileResult<String> {
        self.catalog.keyed_entity(&spec.entity)?;
        let graph = self.graph(spec)?;
        let key = graph.root_key();

        let projection = graph.projection(&spec.columns)?;
        let predicates = render_predicates(&graph, &spec.predicates, params)?;
        let mut order = render_order(&graph, &spec.order_by)?;
        if order.is_empty() {
            order = key.iter().map(|column| format!("{} ASC", column)).collect();
        }
        let order = order.join(", ");

        let offset = params.bind(row_count(paging.skip.unwrap_or(0)));
        let fetch = paging.take.map(|take| params.bind(row_count(take)));

        let from = graph.from_clause();
        let mut inner = format!("SELECT {} {}", key.join(", "), from);
        push_where(&mut inner, &predicates);
        inner.push_str(&format!(" ORDER BY {} OFFSET {} ROWS", order, offset));
        if let Some(fetch) = fetch {
            inner.push_str(&format!(" FETCH NEXT {} ROWS ONLY", fetch));
        }

        let cte = self.options.quote(&self.options.paging_cte);
        let membership = match graph.root.primary_key.as_slice() {
            [single] => format!(
                "{} IN (SELECT {}.{} FROM {})",
                key[0],
                cte,
                self.options.quote(single),
                cte
            ),
            composite => {
                let matches = composite
                    .iter()
                    .zip(&key)
                    .map(|(name, reference)| {
                        format!("{}.{} = {}", cte, self.options.quote(name), reference)
                    })
                    .collect::<Vec<_>>();
                format!(
                    "EXISTS (SELECT 1 FROM {} WHERE {})",
                    cte,
                    matches.join(" AND ")
                )
            }
        };

        let mut outer_filter = vec![membership];
        outer_filter.extend(predicates);

        let mut sql = format!(
            "WITH {} AS ({}) SELECT {} {}",
            cte,
            inner,
            projection.join(", "),
            from
        );
        push_where(&mut sql, &outer_filter);
        sql.push_str(" ORDER BY ");
        sql.push_str(&order);
        if self.options.recompile_hint {
            sql.push_str(" OPTION (RECOMPILE)");
        }
        Ok(sql)
    }

    fn count(&self, branches: &[&QuerySpec], params: &mut ParameterList) -> CompileResult<String> {
        if let [spec] = branches {
            let graph = self.graph(spec)?;
            let target = graph
                .root_key()
                .into_iter()
                .next()
                .unwrap_or_else(|| "*".to_string());
            let predicates = render_predicates(&graph, &spec.predicates, params)?;
            let mut sql = format!("SELECT COUNT({}) {}", target, graph.from_clause());
            push_where(&mut sql, &predicates);
            return Ok(sql);
        }

        // Every arm counts by key only when every branch declares one
        let graphs = branches
            .iter()
            .map(|branch| self.graph(branch))
            .collect::<CompileResult<Vec<_>>>()?;
        let keyed = graphs.iter().all(|graph| !graph.root.primary_key.is_empty());

        let mut arity = None;
        let parts = branches
            .iter()
            .zip(&graphs)
            .map(|(branch, graph)| -> CompileResult<String> {
                let columns = if keyed {
                    graph.root_key()
                } else {
                    graph.projection(&[])?
                };
                match arity {
                    None => arity = Some(columns.len()),
                    Some(expected) if expected != columns.len() => {
                        return Err(SpecificationError::UnionShapeMismatch {
                            expected,
                            found: columns.len(),
                        }
                        .into());
                    }
                    Some(_) => {}
                }
                let predicates = render_predicates(graph, &branch.predicates, params)?;
                let mut sql = format!("SELECT {} {}", columns.join(", "), graph.from_clause());
                push_where(&mut sql, &predicates);
                Ok(sql)
            })
            .collect::<CompileResult<Vec<_>>>()?;
        Ok(format!(
            "SELECT COUNT(*) FROM ({}) AS {}",
            parts.join(" UNION "),
            self.options.quote("Counted")
        ))
    }

    fn exists(&self, branches: &[&QuerySpec], params: &mut ParameterList) -> CompileResult<String> {
        let parts = branches
            .iter()
            .map(|branch| -> CompileResult<String> {
                let graph = self.graph(branch)?;
                let predicates = render_predicates(&graph, &branch.predicates, params)?;
                let mut sql = format!("SELECT 1 {}", graph.from_clause());
                push_where(&mut sql, &predicates);
                Ok(sql)
            })
            .collect::<CompileResult<Vec<_>>>()?;
        Ok(format!(
            "IF EXISTS ({}) SELECT 1 ELSE SELECT 0",
            parts.join(" UNION ")
        ))
    }

    fn delete(&self, branches: &[&QuerySpec], params: &mut ParameterList) -> CompileResult<String> {
        let Some(spec) = branches.first() else {
            return Ok(String::new());
        };
        if branches.len() > 1 {
            warn!(
                dropped = branches.len() - 1,
                "DELETE compiles the first UNION branch only"
            );
        }
        if !spec.order_by.is_empty() || spec.paging.is_some() {
            warn!("DELETE ignores ordering and paging");
        }

        let graph = self.graph(spec)?;
        let predicates = render_predicates(&graph, &spec.predicates, params)?;
        let mut sql = format!("DELETE {} {}", graph.root_table, graph.from_clause());
        push_where(&mut sql, &predicates);
        Ok(sql)
    }

    fn graph(&self, spec: &QuerySpec) -> CompileResult<JoinGraph<'_>> {
        JoinGraph::resolve(
            self.catalog.as_ref(),
            &self.options,
            &spec.entity,
            &spec.joins,
        )
    }
}

/// OFFSET/FETCH row counts beyond `i64::MAX` saturate
fn row_count(value: u64) -> Literal {
    Literal::Integer(i64::try_from(value).unwrap_or(i64::MAX))
}

fn push_where(sql: &mut String, predicates: &[String]) {
    if !predicates.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.join(" AND "));
    }
}

/// Render predicates in declaration order, binding their values
fn render_predicates(
    graph: &JoinGraph<'_>,
    predicates: &[Predicate],
    params: &mut ParameterList,
) -> CompileResult<Vec<String>> {
    predicates
        .iter()
        .map(|predicate| -> CompileResult<String> {
            let column = graph.column(&predicate.column)?;
            let reference = column.reference;
            let rendered = match &predicate.condition {
                Condition::Equal(value) if value.is_null() => format!("{} IS NULL", reference),
                Condition::Equal(value) => {
                    let operator = if column.definition.data_type.is_variable_text() {
                        "LIKE"
                    } else {
                        "="
                    };
                    format!("{} {} {}", reference, operator, params.bind(value.clone()))
                }
                Condition::Between(low, high) => {
                    let low = params.bind(low.clone());
                    let high = params.bind(high.clone());
                    format!("{} BETWEEN {} AND {}", reference, low, high)
                }
                Condition::GreaterOrEqual(value) => {
                    format!("{} >= {}", reference, params.bind(value.clone()))
                }
                Condition::LessOrEqual(value) => {
                    format!("{} <= {}", reference, params.bind(value.clone()))
                }
                Condition::In(values) if values.is_empty() => {
                    return Err(SpecificationError::EmptyInList {
                        column: predicate.column.to_string(),
                    }
                    .into());
                }
                Condition::In(values) => {
                    let placeholders = values
                        .iter()
                        .map(|value| params.bind(value.clone()))
                        .collect::<Vec<_>>();
                    format!("{} IN ({})", reference, placeholders.join(", "))
                }
                Condition::IsNull => format!("{} IS NULL", reference),
            };
            Ok(rendered)
        })
        .collect()
}

fn render_order(graph: &JoinGraph<'_>, order_by: &[OrderBy]) -> CompileResult<Vec<String>> {
    order_by
        .iter()
        .map(|order| -> CompileResult<String> {
            let column = graph.column(&order.column)?;
            Ok(format!(
                "{} {}",
                column.reference,
                order.direction.sql_keyword()
            ))
        })
        .collect()
}
