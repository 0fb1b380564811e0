use crate::lang::ast::{AcceptVisitor, Program, ProgramLine, Statement, Target, Visitor};
use crate::lang::LineNumber;
use std::collections::{BTreeMap, BTreeSet};

/// ## Control flow between program lines
///
/// Every line is one block. Edges come from falling off the end of a
/// line and from the line number operands of GOTO, GOSUB and IF.
/// RETURN and END have no successors; a GOSUB also falls through since
/// control comes back to it.

#[derive(Debug, Default)]
pub struct Flow {
    successors: BTreeMap<LineNumber, Vec<LineNumber>>,
    reachable: BTreeSet<LineNumber>,
}

#[derive(Default)]
struct Targets(Vec<LineNumber>);

impl Visitor for Targets {
    fn visit_target(&mut self, target: &Target) {
        self.0.push(target.line);
    }
}

fn has_loop(line: &ProgramLine) -> bool {
    fn walk(statements: &[Statement]) -> bool {
        statements.iter().any(|s| match s {
            Statement::For(..) | Statement::Next(..) => true,
            Statement::If(_, _, t, e) => walk(t) || walk(e),
            _ => false,
        })
    }
    walk(&line.statements)
}

pub fn build(program: &Program) -> Flow {
    let mut flow = Flow::default();
    let mut lines = program.lines.iter().peekable();
    while let Some(line) = lines.next() {
        let mut targets = Targets::default();
        for statement in &line.statements {
            statement.accept(&mut targets);
        }
        let falls_through = !line.statements.last().map_or(false, Statement::is_terminal);
        if falls_through {
            if let Some(next) = lines.peek() {
                targets.0.push(next.number);
            }
        }
        flow.successors.insert(line.number, targets.0);
    }
    // Lines that hold FOR or NEXT are kept alive since loops pair statically.
    let mut work: Vec<LineNumber> = program
        .lines
        .iter()
        .enumerate()
        .filter(|(index, line)| *index == 0 || has_loop(line))
        .map(|(_, line)| line.number)
        .collect();
    while let Some(number) = work.pop() {
        if !flow.reachable.insert(number) {
            continue;
        }
        if let Some(successors) = flow.successors.get(&number) {
            work.extend(successors.iter().filter(|n| !flow.reachable.contains(*n)));
        }
    }
    flow
}

impl Flow {
    pub fn successors(&self, line: LineNumber) -> &[LineNumber] {
        self.successors
            .get(&line)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_reachable(&self, line: LineNumber) -> bool {
        self.reachable.contains(&line)
    }

    pub fn unreachable(&self) -> impl Iterator<Item = LineNumber> + '_ {
        self.successors
            .keys()
            .copied()
            .filter(move |n| !self.reachable.contains(n))
    }

    /// Drop the lines control can never reach.
    pub fn prune(&self, mut program: Program) -> Program {
        program.lines.retain(|line| self.is_reachable(line.number));
        program
    }
}
