use crate::frontend::lexer::Span;

#[derive(Debug)]
pub struct Program {
    /// Top level statements in source order. Function and class
    /// declarations live in this list next to executable statements; the
    /// executable ones form the body of the synthesized entry function.
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Debug)]
pub struct Identifier {
    pub id: NodeId,
    pub span: Span,
    pub name: String,
}

#[derive(Debug)]
pub struct Statement {
    pub id: NodeId,
    pub span: Span,
    pub kind: StatementKind,
}

#[derive(Debug)]
pub enum StatementKind {
    // Let binding
    VarDecl(Box<VarDecl>),
    // Func declaration
    FuncDecl(Box<FuncDecl>),
    // Class declaration (stub)
    ClassDecl(Box<ClassDecl>),
    If(Box<IfStatement>),
    For(Box<ForStatement>),
    While(Box<WhileStatement>),
    Match(Box<MatchStatement>),
    Print(Box<Expression>),
    Return(Box<Expression>),
    // Bare expression evaluated for its effects
    Expr(Box<Expression>),
}

#[derive(Debug)]
pub struct VarDecl {
    pub name: Identifier,
    pub initializer: Option<Expression>,
}

#[derive(Debug)]
pub struct FuncDecl {
    pub name: Identifier,
    pub parameters: Vec<Identifier>,
    pub body: Vec<Statement>,
}

#[derive(Debug)]
pub struct ClassDecl {
    pub name: Identifier,
    pub base: Option<Identifier>,
    /// Parsed for grammar completeness; not lowered (classes are stubs).
    pub body: Vec<Statement>,
}

#[derive(Debug)]
pub struct IfStatement {
    pub condition: Expression,
    pub then_body: Vec<Statement>,
    pub else_body: Vec<Statement>,
}

#[derive(Debug)]
pub struct ForStatement {
    pub variable: Identifier,
    pub start: Expression,
    pub end: Expression,
    pub body: Vec<Statement>,
}

#[derive(Debug)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Vec<Statement>,
}

#[derive(Debug)]
pub struct MatchStatement {
    pub scrutinee: Expression,
    pub cases: Vec<MatchCase>,
}

#[derive(Debug)]
pub struct MatchCase {
    pub id: NodeId,
    pub span: Span,
    pub pattern: Pattern,
    pub body: Vec<Statement>,
}

#[derive(Debug)]
pub struct Pattern {
    pub id: NodeId,
    pub span: Span,
    pub kind: PatternKind,
}

#[derive(Debug)]
pub enum PatternKind {
    // Case 4:
    Equals(Expression),
    // Case 2..5:
    Range(Expression, Expression),
    // Case <0:
    LessThan(Expression),
    // Case >100:
    GreaterThan(Expression),
}

#[derive(Debug)]
pub struct Expression {
    pub id: NodeId,
    pub span: Span,
    pub kind: ExpressionKind,
}

#[derive(Debug)]
pub enum ExpressionKind {
    IntegerLiteral(i32),
    StringLiteral(String),
    Variable(Identifier),
    Unary {
        operator: UnaryOperatorKind,
        operand: Box<Expression>,
    },
    Binary {
        operator: BinaryOperatorKind,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Call {
        callee: Identifier,
        arguments: Vec<Expression>,
    },
    // Input()
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperatorKind {
    Negate,     // -
    BitwiseNot, // !
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperatorKind {
    Add,                  // +
    Subtract,             // -
    Multiply,             // *
    Divide,               // /
    Equals,               // ==
    NotEquals,            // !=
    LessThan,             // <
    LessThanOrEqualTo,    // <=
    GreaterThan,          // >
    GreaterThanOrEqualTo, // >=
}

impl BinaryOperatorKind {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Equals
                | Self::NotEquals
                | Self::LessThan
                | Self::LessThanOrEqualTo
                | Self::GreaterThan
                | Self::GreaterThanOrEqualTo
        )
    }
}
