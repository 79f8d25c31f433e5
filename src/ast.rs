use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub struct Prototype {
    pub name: String,
    pub args: Vec<String>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Number(f64),
    Variable(String),
    Binary(char, Box<Expression>, Box<Expression>),
    Call(String, Vec<Expression>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Function {
    pub prototype: Prototype,
    pub body: Expression,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ASTNode {
    Extern(Prototype),
    Function(Function),
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Number(value) => write!(f, "NumberExpr: {}", value),
            Expression::Variable(name) => write!(f, "Variable: {}", name),
            Expression::Binary(op, lhs, rhs) => {
                write!(f, "BinaryExpr: {} ( {}, {} ) ", op, lhs, rhs)
            }
            Expression::Call(callee, args) => {
                write!(f, "Call: {}", callee)?;
                for arg in args {
                    write!(f, ", Arg: {}", arg)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Prototype: {}", self.name)?;
        for arg in &self.args {
            write!(f, ", Arg: {}", arg)?;
        }
        Ok(())
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\t{}\n\t{}", self.prototype, self.body)
    }
}

impl fmt::Display for ASTNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ASTNode::Extern(proto) => write!(f, "{}", proto),
            ASTNode::Function(func) => write!(f, "{}", func),
        }
    }
}
