/// Implements the standard operator traits for single-field tuple structs.
///
/// Usage:
/// * `op!(binary MyType, Add, add)` for `MyType + MyType`
/// * `op!(inplace MyType, AddAssign, add_assign)` for `MyType += MyType`
/// * `op!(unary MyType, Neg, neg)` for `-MyType`
#[macro_export]
macro_rules! op {
    (binary $type:ty, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $type {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self::Output {
                Self(std::ops::$trait::$method(self.0, rhs.0))
            }
        }
    };
    (inplace $type:ty, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $type {
            fn $method(&mut self, rhs: Self) {
                std::ops::$trait::$method(&mut self.0, rhs.0)
            }
        }
    };
    (unary $type:ty, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $type {
            type Output = Self;

            fn $method(self) -> Self::Output {
                Self(std::ops::$trait::$method(self.0))
            }
        }
    };
}
