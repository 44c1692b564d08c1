//! Builder stages. Each wraps the plan built so far.

use super::{Clause, JoinItem, JoinKind, QueryPlan, Stage};
use crate::condition::Condition;
use crate::expr::{Expr, Sort, Table};
use crate::render::{Render, RenderContext, RenderSession};

macro_rules! stage {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        #[must_use = "a stage does nothing until it is rendered or embedded"]
        pub struct $name {
            plan: QueryPlan,
        }

        impl $name {
            fn with(mut plan: QueryPlan, clause: Clause) -> Self {
                plan.push(clause);
                Self { plan }
            }
        }

        impl Stage for $name {
            fn plan(&self) -> &QueryPlan {
                &self.plan
            }
        }

        impl Render for $name {
            fn render(&self, ctx: RenderContext, session: &mut RenderSession<'_>) -> String {
                self.plan.render(ctx, session)
            }
        }
    };
}

stage!(
    /// After `SELECT`
    SelectStage
);
stage!(
    /// After `FROM` or a completed join
    FromStage
);
stage!(
    /// After `JOIN`, waiting for its ON condition
    JoinStage
);
stage!(
    /// After `WHERE`
    WhereStage
);
stage!(
    /// After `GROUP BY`
    GroupByStage
);
stage!(
    /// After `HAVING`
    HavingStage
);
stage!(
    /// After `ORDER BY`
    OrderByStage
);
stage!(
    /// After `LIMIT`
    LimitStage
);
stage!(
    /// After `OFFSET`
    OffsetStage
);

fn group_by_clause(items: impl IntoIterator<Item = impl Into<Expr>>) -> Clause {
    Clause::GroupBy(items.into_iter().map(Into::into).collect())
}

fn order_by_clause(items: impl IntoIterator<Item = Sort>) -> Clause {
    Clause::OrderBy(items.into_iter().collect())
}

impl SelectStage {
    pub(super) fn new(distinct: bool, items: Vec<Expr>) -> Self {
        Self::with(QueryPlan::default(), Clause::Select { distinct, items })
    }

    /// `FROM source`
    pub fn from(self, source: impl Into<Table>) -> FromStage {
        FromStage::with(self.plan, Clause::From(source.into()))
    }
}

impl FromStage {
    fn join_kind(self, kind: JoinKind, target: Table) -> JoinStage {
        JoinStage::with(
            self.plan,
            Clause::Join {
                kind,
                target,
                on: None,
            },
        )
    }

    /// `JOIN target`
    pub fn join(self, target: impl Into<Table>) -> JoinStage {
        self.join_kind(JoinKind::Inner, target.into())
    }

    /// `LEFT JOIN target`
    pub fn left_join(self, target: impl Into<Table>) -> JoinStage {
        self.join_kind(JoinKind::Left, target.into())
    }

    /// `RIGHT JOIN target`
    pub fn right_join(self, target: impl Into<Table>) -> JoinStage {
        self.join_kind(JoinKind::Right, target.into())
    }

    /// Chain of inner joins, in order.
    ///
    /// `None` entries are skipped. An item without a condition emits a JOIN
    /// with no ON clause.
    pub fn joins(mut self, items: impl IntoIterator<Item = impl Into<Option<JoinItem>>>) -> Self {
        for item in items.into_iter().filter_map(Into::into) {
            self.plan.push(Clause::Join {
                kind: JoinKind::Inner,
                target: item.target,
                on: item.on,
            });
        }
        self
    }

    /// `WHERE condition`
    pub fn where_(self, condition: Condition) -> WhereStage {
        WhereStage::with(self.plan, Clause::Where(condition))
    }

    /// `GROUP BY items`
    pub fn group_by(self, items: impl IntoIterator<Item = impl Into<Expr>>) -> GroupByStage {
        GroupByStage::with(self.plan, group_by_clause(items))
    }

    /// `ORDER BY items`
    pub fn order_by(self, items: impl IntoIterator<Item = Sort>) -> OrderByStage {
        OrderByStage::with(self.plan, order_by_clause(items))
    }
}

impl JoinStage {
    /// Attach the ON condition to the pending join
    pub fn on(mut self, condition: Condition) -> FromStage {
        if let Some(Clause::Join { on, .. }) = self.plan.last_mut() {
            *on = Some(condition);
        }
        FromStage { plan: self.plan }
    }
}

impl WhereStage {
    /// `GROUP BY items`
    pub fn group_by(self, items: impl IntoIterator<Item = impl Into<Expr>>) -> GroupByStage {
        GroupByStage::with(self.plan, group_by_clause(items))
    }

    /// `ORDER BY items`
    pub fn order_by(self, items: impl IntoIterator<Item = Sort>) -> OrderByStage {
        OrderByStage::with(self.plan, order_by_clause(items))
    }
}

impl GroupByStage {
    /// `HAVING condition`
    pub fn having(self, condition: Condition) -> HavingStage {
        HavingStage::with(self.plan, Clause::Having(condition))
    }

    /// `ORDER BY items`
    pub fn order_by(self, items: impl IntoIterator<Item = Sort>) -> OrderByStage {
        OrderByStage::with(self.plan, order_by_clause(items))
    }
}

impl HavingStage {
    /// `ORDER BY items`
    pub fn order_by(self, items: impl IntoIterator<Item = Sort>) -> OrderByStage {
        OrderByStage::with(self.plan, order_by_clause(items))
    }
}

impl OrderByStage {
    /// `LIMIT n`
    pub fn limit(self, n: u64) -> LimitStage {
        LimitStage::with(self.plan, Clause::Limit(n))
    }
}

impl LimitStage {
    /// `OFFSET n`
    pub fn offset(self, n: u64) -> OffsetStage {
        OffsetStage::with(self.plan, Clause::Offset(n))
    }
}
