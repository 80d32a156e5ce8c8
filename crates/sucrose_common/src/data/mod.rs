pub mod prim;

pub mod sugar_ast;

pub mod kernel_ast;

pub mod cell_ast;

pub mod monadic_ast;

pub mod maltose_ast;

pub mod hoisted_ast;
