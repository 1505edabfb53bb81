use super::ast::{
    ArrayLiteral, BlockStatement, Call, Expression, ExpressionStatement, FunctionLiteral,
    HashLiteral, If, Index, Infix, LetStatement, Prefix, Program, ReturnStatement, Statement
};

/// Post-order rewrite of a syntax tree.
///
/// Children are rewritten before their parent, and the modifier sees every
/// expression in the tree, including the ones it produced for children.
/// The tree is consumed and a new one is built, so subtrees are never shared
/// between the input and the output. The first `Err` returned by the
/// modifier stops the walk.
pub trait Modify: Sized {
    fn modify<E, F>(self, modifier: &mut F) -> Result<Self, E>
        where F: FnMut(Expression) -> Result<Expression, E>;
}

impl Modify for Program {
    fn modify<E, F>(self, modifier: &mut F) -> Result<Self, E>
        where F: FnMut(Expression) -> Result<Expression, E>
    {
        let statements = self.statements.into_iter()
            .map(|statement| statement.modify(modifier))
            .collect::<Result<Vec<_>, E>>()?;

        Ok(Program { statements, ..self })
    }
}

impl Modify for Statement {
    fn modify<E, F>(self, modifier: &mut F) -> Result<Self, E>
        where F: FnMut(Expression) -> Result<Expression, E>
    {
        let statement = match self {
            Statement::Let(LetStatement { name, value, location }) => Statement::Let(LetStatement {
                name,
                value: value.modify(modifier)?,
                location
            }),
            Statement::Return(ReturnStatement { value, location }) => Statement::Return(ReturnStatement {
                value: value.modify(modifier)?,
                location
            }),
            Statement::Expression(ExpressionStatement { expression, location }) => {
                Statement::Expression(ExpressionStatement {
                    expression: expression.modify(modifier)?,
                    location
                })
            }
        };

        Ok(statement)
    }
}

impl Modify for BlockStatement {
    fn modify<E, F>(self, modifier: &mut F) -> Result<Self, E>
        where F: FnMut(Expression) -> Result<Expression, E>
    {
        let statements = self.statements.into_iter()
            .map(|statement| statement.modify(modifier))
            .collect::<Result<Vec<_>, E>>()?;

        Ok(BlockStatement { statements, ..self })
    }
}

fn modify_boxed<E, F>(expression: Box<Expression>, modifier: &mut F) -> Result<Box<Expression>, E>
    where F: FnMut(Expression) -> Result<Expression, E>
{
    Ok(Box::new((*expression).modify(modifier)?))
}

fn modify_all<E, F>(expressions: Vec<Expression>, modifier: &mut F) -> Result<Vec<Expression>, E>
    where F: FnMut(Expression) -> Result<Expression, E>
{
    expressions.into_iter()
        .map(|expression| expression.modify(modifier))
        .collect()
}

impl Modify for Expression {
    fn modify<E, F>(self, modifier: &mut F) -> Result<Self, E>
        where F: FnMut(Expression) -> Result<Expression, E>
    {
        let expression = match self {
            Expression::Prefix(Prefix { operator, right, location }) => Expression::Prefix(Prefix {
                operator,
                right: modify_boxed(right, modifier)?,
                location
            }),
            Expression::Infix(Infix { left, operator, right, location }) => Expression::Infix(Infix {
                left: modify_boxed(left, modifier)?,
                operator,
                right: modify_boxed(right, modifier)?,
                location
            }),
            Expression::Index(Index { left, index, location }) => Expression::Index(Index {
                left: modify_boxed(left, modifier)?,
                index: modify_boxed(index, modifier)?,
                location
            }),
            Expression::If(If { condition, consequence, alternative, location }) => Expression::If(If {
                condition: modify_boxed(condition, modifier)?,
                consequence: consequence.modify(modifier)?,
                alternative: match alternative {
                    Some(alternative) => Some(alternative.modify(modifier)?),
                    None => None
                },
                location
            }),
            Expression::Function(FunctionLiteral { parameters, body, location }) => {
                Expression::Function(FunctionLiteral {
                    parameters,
                    body: body.modify(modifier)?,
                    location
                })
            },
            Expression::Call(Call { function, arguments, location }) => Expression::Call(Call {
                function: modify_boxed(function, modifier)?,
                arguments: modify_all(arguments, modifier)?,
                location
            }),
            Expression::Array(ArrayLiteral { elements, location }) => Expression::Array(ArrayLiteral {
                elements: modify_all(elements, modifier)?,
                location
            }),
            Expression::Hash(HashLiteral { pairs, location }) => {
                let pairs = pairs.into_iter()
                    .map(|(key, value)| Ok((key.modify(modifier)?, value.modify(modifier)?)))
                    .collect::<Result<Vec<_>, E>>()?;

                Expression::Hash(HashLiteral { pairs, location })
            },
            // leaves, and macro literals which are never rewritten
            expression @ (
                Expression::Identifier(_)
                | Expression::Integer(_)
                | Expression::String(_)
                | Expression::Boolean(_)
                | Expression::Macro(_)
            ) => expression
        };

        modifier(expression)
    }
}
